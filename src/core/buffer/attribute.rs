use crate::core::attribute::ComponentDataType;
use crate::core::shared::DataValue;

/// Byte storage for attribute values. Every value occupies
/// `component_type.size() * num_components` bytes, stored little-endian.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AttributeBuffer {
    /// Contains the data of the attribute.
    data: Vec<u8>,

    /// The number of values of the attribute.
    len: usize,

    component_type: ComponentDataType,

    num_components: usize,
}

impl AttributeBuffer {
    /// Allocates `len` zeroed values. Values are then written in any order with
    /// [`AttributeBuffer::set_bytes`].
    pub fn with_len(component_type: ComponentDataType, num_components: usize, len: usize) -> Self {
        Self {
            data: vec![0; component_type.size() * num_components * len],
            len,
            component_type,
            num_components,
        }
    }

    /// Wraps already encoded values. `data.len()` must be a multiple of the stride.
    pub fn from_bytes(data: Vec<u8>, component_type: ComponentDataType, num_components: usize) -> Self {
        let stride = component_type.size() * num_components;
        assert!(
            stride > 0 && data.len() % stride == 0,
            "Buffer of {} bytes cannot hold values of {} bytes",
            data.len(), stride
        );
        let len = data.len() / stride;
        Self { data, len, component_type, num_components }
    }

    /// Builds the buffer from a flat list of components.
    pub fn from_components<T: DataValue>(components: &[T], num_components: usize) -> Self {
        assert!(num_components > 0, "An attribute value needs at least one component");
        assert!(
            components.len() % num_components == 0,
            "{} components cannot be split into values of {} components",
            components.len(), num_components
        );
        let mut data = Vec::with_capacity(components.len() * T::get_dyn().size());
        for &c in components {
            c.write_to(&mut data);
        }
        Self::from_bytes(data, T::get_dyn(), num_components)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// The number of bytes of one value.
    #[inline]
    pub fn stride(&self) -> usize {
        self.component_type.size() * self.num_components
    }

    #[inline]
    pub fn get_component_type(&self) -> ComponentDataType {
        self.component_type
    }

    #[inline]
    pub fn get_num_components(&self) -> usize {
        self.num_components
    }

    pub fn get_bytes(&self, idx: usize) -> &[u8] {
        assert!(idx < self.len, "Index out of bounds: The index {} is out of bounds for the attribute buffer with length {}", idx, self.len);
        let stride = self.stride();
        &self.data[idx * stride..(idx + 1) * stride]
    }

    pub fn set_bytes(&mut self, idx: usize, bytes: &[u8]) {
        assert!(idx < self.len, "Index out of bounds: The index {} is out of bounds for the attribute buffer with length {}", idx, self.len);
        let stride = self.stride();
        assert_eq!(bytes.len(), stride, "Cannot write {} bytes into a value of {} bytes", bytes.len(), stride);
        self.data[idx * stride..(idx + 1) * stride].copy_from_slice(bytes);
    }

    /// Reads the components of the `idx`-th value.
    pub fn get<T: DataValue>(&self, idx: usize) -> Vec<T> {
        assert_eq!(
            T::get_dyn(), self.component_type,
            "Cannot read from buffer: Trying to read {:?}, but the buffer stores the elements of type {:?}",
            T::get_dyn(), self.component_type
        );
        let size = self.component_type.size();
        self.get_bytes(idx)
            .chunks_exact(size)
            .map(T::read_le)
            .collect()
    }

    /// Writes the components of the `idx`-th value.
    pub fn set<T: DataValue>(&mut self, idx: usize, value: &[T]) {
        assert_eq!(
            T::get_dyn(), self.component_type,
            "Data type mismatch: Cannot write data of type {:?} into attribute buffer of type {:?}",
            T::get_dyn(), self.component_type
        );
        assert!(
            value.len() == self.num_components,
            "Number of components mismatch: Cannot write data with {} components into attribute buffer with {} components",
            value.len(), self.num_components
        );
        let mut bytes = Vec::with_capacity(self.stride());
        for &c in value {
            c.write_to(&mut bytes);
        }
        self.set_bytes(idx, &bytes);
    }
}
