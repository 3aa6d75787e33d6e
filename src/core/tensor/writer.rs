use crate::core::pbrt::*;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

struct PendingField {
    name: String,
    dtype: DataType,
    shape: Vec<u64>,
    data: Vec<u8>,
}

/// Builds tensor files in the format read by [`Tensor`].
///
/// Payloads are laid out directly after the header, in insertion order.
#[derive(Default)]
pub struct TensorWriter {
    fields: Vec<PendingField>,
}

impl TensorWriter {
    pub fn new() -> Self {
        TensorWriter { fields: Vec::new() }
    }

    pub fn add_field(
        &mut self,
        name: &str,
        dtype: DataType,
        shape: &[u64],
        data: Vec<u8>,
    ) -> Result<&mut Self, PbrtError> {
        if name.len() > u16::MAX as usize || shape.len() > u16::MAX as usize {
            return Err(PbrtError::invalid_parameter("field name or rank too large"));
        }
        if self.fields.iter().any(|f| f.name == name) {
            let msg = format!("duplicate field \"{}\"", name);
            return Err(PbrtError::invalid_parameter(&msg));
        }
        let n: u64 = shape.iter().product();
        if n as usize * dtype.size() != data.len() {
            let msg = format!(
                "field \"{}\": shape {:?} needs {} bytes, got {}",
                name,
                shape,
                n as usize * dtype.size(),
                data.len()
            );
            return Err(PbrtError::invalid_parameter(&msg));
        }
        self.fields.push(PendingField {
            name: name.to_string(),
            dtype,
            shape: shape.to_vec(),
            data,
        });
        return Ok(self);
    }

    pub fn add_f32(&mut self, name: &str, shape: &[u64], values: &[f32]) -> Result<&mut Self, PbrtError> {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        return self.add_field(name, DataType::Float32, shape, data);
    }

    pub fn add_u8(&mut self, name: &str, shape: &[u64], values: &[u8]) -> Result<&mut Self, PbrtError> {
        return self.add_field(name, DataType::UInt8, shape, values.to_vec());
    }

    fn header_size(&self) -> u64 {
        let mut size = TENSOR_HEADER_SIZE;
        for f in self.fields.iter() {
            // name length, name, ndim, dtype, offset, shape
            size += 2 + f.name.len() as u64 + 2 + 1 + 8 + 8 * f.shape.len() as u64;
        }
        return size;
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(TENSOR_MAGIC);
        out.extend_from_slice(&TENSOR_VERSION);
        out.extend_from_slice(&(self.fields.len() as u32).to_le_bytes());
        let mut offset = self.header_size();
        for f in self.fields.iter() {
            out.extend_from_slice(&(f.name.len() as u16).to_le_bytes());
            out.extend_from_slice(f.name.as_bytes());
            out.extend_from_slice(&(f.shape.len() as u16).to_le_bytes());
            out.push(f.dtype.tag());
            out.extend_from_slice(&offset.to_le_bytes());
            for s in f.shape.iter() {
                out.extend_from_slice(&s.to_le_bytes());
            }
            offset += f.data.len() as u64;
        }
        for f in self.fields.iter() {
            out.extend_from_slice(&f.data);
        }
        return out;
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), PbrtError> {
        writer.write_all(&self.to_bytes())?;
        return Ok(());
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PbrtError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        let mut w = TensorWriter::new();
        w.add_f32("a", &[2, 2], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        w.add_u8("b", &[1], &[1]).unwrap();
        assert!(w.add_u8("b", &[1], &[1]).is_err());
        assert!(w.add_f32("c", &[3], &[1.0]).is_err());

        let t = Tensor::from_bytes(&w.to_bytes(), "mem").unwrap();
        assert_eq!(t.len(), 2);
        let a = t.field("a").unwrap();
        assert_eq!(a.shape, vec![2, 2]);
        assert_eq!(a.to_floats().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(t.field("b").unwrap().to_floats().is_err());
    }
}
