use crate::core::pbrt::*;

use log::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

pub const TENSOR_MAGIC: &[u8; 12] = b"tensor_file\0";
pub const TENSOR_VERSION: [u8; 2] = [1, 0];
/// magic + version + field count
pub const TENSOR_HEADER_SIZE: u64 = 12 + 2 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    UInt8 = 1,
    Int8 = 2,
    UInt16 = 3,
    Int16 = 4,
    UInt32 = 5,
    Int32 = 6,
    UInt64 = 7,
    Int64 = 8,
    Float16 = 9,
    Float32 = 10,
    Float64 = 11,
}

impl DataType {
    pub fn from_tag(tag: u8) -> Option<DataType> {
        let t = match tag {
            1 => DataType::UInt8,
            2 => DataType::Int8,
            3 => DataType::UInt16,
            4 => DataType::Int16,
            5 => DataType::UInt32,
            6 => DataType::Int32,
            7 => DataType::UInt64,
            8 => DataType::Int64,
            9 => DataType::Float16,
            10 => DataType::Float32,
            11 => DataType::Float64,
            _ => return None,
        };
        return Some(t);
    }

    pub fn tag(self) -> u8 {
        return self as u8;
    }

    pub fn size(self) -> usize {
        return match self {
            DataType::UInt8 | DataType::Int8 => 1,
            DataType::UInt16 | DataType::Int16 | DataType::Float16 => 2,
            DataType::UInt32 | DataType::Int32 | DataType::Float32 => 4,
            DataType::UInt64 | DataType::Int64 | DataType::Float64 => 8,
        };
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::UInt8 => "uint8_t",
            DataType::Int8 => "int8_t",
            DataType::UInt16 => "uint16_t",
            DataType::Int16 => "int16_t",
            DataType::UInt32 => "uint32_t",
            DataType::Int32 => "int32_t",
            DataType::UInt64 => "uint64_t",
            DataType::Int64 => "int64_t",
            DataType::Float16 => "float16_t",
            DataType::Float32 => "float32_t",
            DataType::Float64 => "float64_t",
        };
        write!(f, "{}", name)
    }
}

/// One named array of a tensor file. Owns its payload bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub dtype: DataType,
    pub offset: u64,
    pub shape: Vec<u64>,
    pub data: Vec<u8>,
}

impl Field {
    pub fn ndim(&self) -> usize {
        return self.shape.len();
    }

    pub fn num_elements(&self) -> usize {
        return self.shape.iter().product::<u64>() as usize;
    }

    /// Decodes a `Float32` field into the crate's `Float` type.
    pub fn to_floats(&self) -> Result<Vec<Float>, PbrtError> {
        if self.dtype != DataType::Float32 {
            let msg = format!("expected a float32_t field, found {}", self.dtype);
            return Err(PbrtError::invalid_format(&msg));
        }
        let v = self
            .data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as Float)
            .collect();
        return Ok(v);
    }

    pub fn info(&self) -> FieldInfo {
        FieldInfo {
            dtype: self.dtype,
            offset: self.offset,
            shape: self.shape.clone(),
        }
    }
}

/// Header metadata of a field, without its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub dtype: DataType,
    pub offset: u64,
    pub shape: Vec<u64>,
}

/// Serializable summary of a tensor file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorInfo {
    pub filename: String,
    pub size: u64,
    pub fields: BTreeMap<String, FieldInfo>,
}

/// In-memory contents of a binary tensor file.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    filename: String,
    size: u64,
    fields: BTreeMap<String, Field>,
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, PbrtError> {
    let mut buffer = [0u8; 1];
    reader.read_exact(&mut buffer)?;
    return Ok(buffer[0]);
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16, PbrtError> {
    let mut buffer = [0u8; 2];
    reader.read_exact(&mut buffer)?;
    return Ok(u16::from_le_bytes(buffer));
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, PbrtError> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    return Ok(u32::from_le_bytes(buffer));
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64, PbrtError> {
    let mut buffer = [0u8; 8];
    reader.read_exact(&mut buffer)?;
    return Ok(u64::from_le_bytes(buffer));
}

impl Tensor {
    fn error(filename: &str, what: &str) -> PbrtError {
        let msg = format!("{}: Tensor: {}", filename, what);
        return PbrtError::invalid_format(&msg);
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Tensor, PbrtError> {
        let path = path.as_ref();
        let filename = path.to_string_lossy().to_string();
        let fp = File::open(path).map_err(|e| {
            let msg = format!("{}: unable to open file: {}", filename, e);
            PbrtError::new(PbrtErrorKind::Io, &msg)
        })?;
        let mut reader = BufReader::new(fp);
        let tensor = Self::from_reader(&mut reader, &filename)?;
        info!(
            "Loaded tensor \"{}\" ({} bytes, {} fields)",
            filename,
            tensor.size,
            tensor.fields.len()
        );
        return Ok(tensor);
    }

    pub fn from_bytes(bytes: &[u8], filename: &str) -> Result<Tensor, PbrtError> {
        let mut cursor = Cursor::new(bytes);
        return Self::from_reader(&mut cursor, filename);
    }

    /// Parses a complete tensor file. Any structural problem aborts the load.
    pub fn from_reader<R: Read + Seek>(reader: &mut R, filename: &str) -> Result<Tensor, PbrtError> {
        let size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        if size < TENSOR_HEADER_SIZE {
            return Err(Self::error(filename, "Invalid tensor file: too small, truncated?"));
        }

        let mut header = [0u8; 12];
        let mut version = [0u8; 2];
        reader.read_exact(&mut header)?;
        reader.read_exact(&mut version)?;
        let n_fields = read_u32(reader)?;
        if &header != TENSOR_MAGIC {
            return Err(Self::error(filename, "Invalid tensor file: invalid header."));
        }
        if version != TENSOR_VERSION {
            return Err(Self::error(filename, "Invalid tensor file: unknown file version."));
        }

        let mut fields = BTreeMap::new();
        for _ in 0..n_fields {
            let name_length = read_u16(reader)? as usize;
            let mut name = vec![0u8; name_length];
            reader.read_exact(&mut name)?;
            let name = String::from_utf8(name)
                .map_err(|_| Self::error(filename, "Invalid tensor file: field name is not UTF-8."))?;
            let ndim = read_u16(reader)? as usize;
            let tag = read_u8(reader)?;
            let offset = read_u64(reader)?;
            let dtype = DataType::from_tag(tag)
                .ok_or_else(|| Self::error(filename, "Invalid tensor file: unknown type."))?;

            let mut shape = Vec::with_capacity(ndim);
            let mut total_size = dtype.size() as u64;
            for _ in 0..ndim {
                let n = read_u64(reader)?;
                shape.push(n);
                total_size = total_size.checked_mul(n).ok_or_else(|| {
                    Self::error(filename, "Invalid tensor file: field size overflows.")
                })?;
            }
            let end = offset.checked_add(total_size);
            if end.map_or(true, |e| e > size) {
                let msg = format!("Invalid tensor file: field \"{}\" is truncated.", name);
                return Err(Self::error(filename, &msg));
            }

            let cur_pos = reader.stream_position()?;
            reader.seek(SeekFrom::Start(offset))?;
            let mut data = vec![0u8; total_size as usize];
            reader.read_exact(&mut data)?;
            reader.seek(SeekFrom::Start(cur_pos))?;

            let field = Field {
                dtype,
                offset,
                shape,
                data,
            };
            if fields.insert(name.clone(), field).is_some() {
                let msg = format!("Invalid tensor file: duplicate field \"{}\".", name);
                return Err(Self::error(filename, &msg));
            }
        }

        Ok(Tensor {
            filename: filename.to_string(),
            size,
            fields,
        })
    }

    pub fn filename(&self) -> &str {
        return &self.filename;
    }

    /// Total size of the file in bytes.
    pub fn size(&self) -> u64 {
        return self.size;
    }

    pub fn len(&self) -> usize {
        return self.fields.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.fields.is_empty();
    }

    pub fn has_field(&self, name: &str) -> bool {
        return self.fields.contains_key(name);
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        return self.fields.keys().map(|k| k.as_str());
    }

    pub fn field(&self, name: &str) -> Result<&Field, PbrtError> {
        return self.fields.get(name).ok_or_else(|| {
            let msg = format!("missing field \"{}\"", name);
            Self::error(&self.filename, &msg)
        });
    }

    /// Moves a field out of the tensor.
    pub fn take_field(&mut self, name: &str) -> Result<Field, PbrtError> {
        let filename = &self.filename;
        return self.fields.remove(name).ok_or_else(|| {
            let msg = format!("missing field \"{}\"", name);
            Self::error(filename, &msg)
        });
    }

    pub fn info(&self) -> TensorInfo {
        TensorInfo {
            filename: self.filename.clone(),
            size: self.size,
            fields: self
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), v.info()))
                .collect(),
        }
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tensor[")?;
        writeln!(f, "  filename = \"{}\",", self.filename)?;
        writeln!(f, "  size = {},", self.size)?;
        writeln!(f, "  fields = {{")?;
        let n = self.fields.len();
        for (i, (name, field)) in self.fields.iter().enumerate() {
            let shape = field
                .shape
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "    \"{}\" => [", name)?;
            writeln!(f, "      dtype = {},", field.dtype)?;
            writeln!(f, "      offset = {},", field.offset)?;
            writeln!(f, "      shape = [{}]", shape)?;
            writeln!(f, "    ]{}", if i + 1 < n { "," } else { "" })?;
        }
        writeln!(f, "  }}")?;
        write!(f, "]")
    }
}
