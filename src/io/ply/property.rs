use crate::core::shared::{converter, DataValue};
use super::header::PlyProperty;

/// Reads the values of a property as `T`, whatever type the header declares.
/// Conversion follows the semantics of an `as` cast.
pub struct PropertyReader<'a, T: DataValue> {
    property: &'a PlyProperty,
    convert: fn(&[u8]) -> T,
}

impl<'a, T: DataValue> PropertyReader<'a, T> {
    pub fn new(property: &'a PlyProperty) -> Self {
        Self {
            property,
            convert: converter::<T>(property.data_type()),
        }
    }

    /// Reads the `i`-th value. For a list property, `i` indexes the concatenated list values.
    pub fn read_value(&self, i: usize) -> T {
        let size = self.property.data_type().size();
        (self.convert)(&self.property.data()[i * size..(i + 1) * size])
    }

    /// Returns `(offset, count)` of the `i`-th list.
    pub fn list_entry(&self, i: usize) -> (usize, usize) {
        self.property.list_data()[i]
    }

    /// Reads the `i`-th list in full.
    pub fn read_list(&self, i: usize) -> Vec<T> {
        let (offset, count) = self.list_entry(i);
        (offset..offset + count).map(|k| self.read_value(k)).collect()
    }

    pub fn num_values(&self) -> usize {
        self.property.num_values()
    }

    pub fn num_lists(&self) -> usize {
        self.property.list_data().len()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ply::header::PlyReader;

    #[test]
    fn test_read_converts() {
        let mut data = b"ply\nformat binary_little_endian 1.0\nelement vertex 3\nproperty short v\nend_header\n".to_vec();
        for v in [-3i16, 0, 1000] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let schema = PlyReader::read(&data).unwrap();
        let property = schema.get_element("vertex").unwrap().get_property("v").unwrap();

        let reader = PropertyReader::<f32>::new(property);
        assert_eq!(reader.num_values(), 3);
        assert_eq!((0..3).map(|i| reader.read_value(i)).collect::<Vec<_>>(), vec![-3.0, 0.0, 1000.0]);
        let reader = PropertyReader::<i32>::new(property);
        assert_eq!(reader.read_value(0), -3);
    }

    #[test]
    fn test_lists() {
        let mut data = b"ply\nformat binary_little_endian 1.0\nelement face 3\nproperty list uchar uint vertex_index\nend_header\n".to_vec();
        data.extend_from_slice(&[4, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]);
        data.push(0);
        data.extend_from_slice(&[2, 9, 0, 0, 0, 8, 0, 0, 0]);
        let schema = PlyReader::read(&data).unwrap();
        let property = schema.get_element("face").unwrap().get_property("vertex_index").unwrap();

        let reader = PropertyReader::<u32>::new(property);
        assert_eq!(reader.num_lists(), 3);
        assert_eq!(reader.list_entry(1), (4, 0));
        assert_eq!(reader.read_list(0), vec![0, 1, 2, 3]);
        assert!(reader.read_list(1).is_empty());
        assert_eq!(reader.read_list(2), vec![9, 8]);
    }
}
