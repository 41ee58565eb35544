use std::collections::HashMap;

use serde::Serialize;

use crate::core::shared::{AttributeValueIdx, DataValue, PointIdx};
use super::buffer::attribute::AttributeBuffer;

/// Represents a per-point attribute of a point cloud or a mesh, e.g. positions, colors,
/// or the spherical harmonics coefficients of a gaussian splat.
/// The struct does not carry static type information; the component type and the number
/// of components are stored dynamically, and values are stored as little-endian bytes.
///
/// An attribute may store fewer values than there are points. In that case the
/// point-to-value map tells which value each point uses (see [`Attribute::get_att_idx`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
	/// attribute id
	id: AttributeId,

	/// attribute buffer
	buffer: AttributeBuffer,

	/// attribute type
	att_type: AttributeType,

	/// an optional mapping from point index to the attribute value index.
	/// `None` means identity mapping.
	point_to_att_val_map: Option<Vec<AttributeValueIdx>>,
}

impl Attribute {
	/// Creates an attribute with `len` zero-initialized values, one per point.
	/// The values are expected to be filled with [`Attribute::set_value`].
	pub fn new_with_len(id: AttributeId, att_type: AttributeType, component_type: ComponentDataType, num_components: usize, len: usize) -> Self {
		Self {
			id,
			buffer: AttributeBuffer::with_len(component_type, num_components, len),
			att_type,
			point_to_att_val_map: None,
		}
	}

	/// Creates an attribute from a flat list of components, `num_components` per point.
	pub fn from_components<Data: DataValue>(id: AttributeId, att_type: AttributeType, num_components: usize, components: &[Data]) -> Self {
		Self {
			id,
			buffer: AttributeBuffer::from_components(components, num_components),
			att_type,
			point_to_att_val_map: None,
		}
	}

	/// Returns the components of the value used by the point `p_idx`.
	pub fn get<Data: DataValue>(&self, p_idx: PointIdx) -> Vec<Data> {
		self.buffer.get(usize::from(self.get_att_idx(p_idx)))
	}

	/// Writes the components of the `val_idx`-th stored value.
	pub fn set_value<Data: DataValue>(&mut self, val_idx: AttributeValueIdx, value: &[Data]) {
		self.buffer.set(usize::from(val_idx), value);
	}

	/// Returns the raw bytes of the value used by the point `p_idx`.
	#[inline]
	pub fn get_as_bytes(&self, p_idx: PointIdx) -> &[u8] {
		self.buffer.get_bytes(usize::from(self.get_att_idx(p_idx)))
	}

	#[inline]
	pub fn get_component_type(&self) -> ComponentDataType {
		self.buffer.get_component_type()
	}

	#[inline]
	pub fn get_num_components(&self) -> usize {
		self.buffer.get_num_components()
	}

	/// The number of bytes of one value.
	#[inline]
	pub fn byte_stride(&self) -> usize {
		self.buffer.stride()
	}

	#[inline]
	pub fn get_id(&self) -> AttributeId {
		self.id
	}

	#[inline]
	pub(crate) fn set_id(&mut self, id: AttributeId) {
		self.id = id;
	}

	#[inline]
	pub fn get_attribute_type(&self) -> AttributeType {
		self.att_type
	}

	/// The number of points the attribute is defined on.
	#[inline(always)]
	pub fn len(&self) -> usize {
		if let Some(f) = &self.point_to_att_val_map {
			f.len()
		} else {
			self.buffer.len()
		}
	}

	#[inline(always)]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	#[inline(always)]
	pub fn num_unique_values(&self) -> usize {
		self.buffer.len()
	}

	/// Returns the index of the value used by the point `p_idx`.
	#[inline]
	pub fn get_att_idx(&self, p_idx: PointIdx) -> AttributeValueIdx {
		let idx = usize::from(p_idx);
		assert!(
			idx < self.len(),
			"Index out of bounds: idx = {}, len = {}",
			idx,
			self.len()
		);
		if let Some(ref point_to_att_val_map) = self.point_to_att_val_map {
			point_to_att_val_map[idx]
		} else {
			// otherwise, we use identity mapping
			AttributeValueIdx::from(idx)
		}
	}

	pub(crate) fn set_point_to_att_val_map(&mut self, map: Option<Vec<AttributeValueIdx>>) {
		if let Some(ref map) = map {
			debug_assert!(map.iter().all(|&v| usize::from(v) < self.num_unique_values()));
		}
		self.point_to_att_val_map = map;
	}

	pub fn is_identity_mapped(&self) -> bool {
		self.point_to_att_val_map.is_none()
	}

	/// returns all stored values as a flat list of components.
	pub fn unique_vals_as_components<Data: DataValue>(&self) -> Vec<Data> {
		(0..self.num_unique_values())
			.flat_map(|i| self.buffer.get::<Data>(i))
			.collect()
	}

	/// Merges stored values that are bitwise identical and points the affected points to the
	/// surviving value. The first occurrence of each value keeps its relative order.
	/// Returns the number of removed values.
	pub fn remove_duplicate_values(&mut self) -> usize {
		let num_values = self.num_unique_values();
		let stride = self.byte_stride();

		let (data, old_to_new) = {
			let mut seen: HashMap<&[u8], AttributeValueIdx> = HashMap::with_capacity(num_values);
			let mut data = Vec::with_capacity(num_values * stride);
			let mut old_to_new = Vec::with_capacity(num_values);
			for i in 0..num_values {
				let bytes = self.buffer.get_bytes(i);
				let next = AttributeValueIdx::from(seen.len());
				let new_idx = *seen.entry(bytes).or_insert_with(|| {
					data.extend_from_slice(bytes);
					next
				});
				old_to_new.push(new_idx);
			}
			(data, old_to_new)
		};

		let num_removed = num_values - data.len() / stride.max(1);
		if num_removed == 0 {
			return 0;
		}

		let map = (0..self.len())
			.map(|p| old_to_new[usize::from(self.get_att_idx(PointIdx::from(p)))])
			.collect();
		self.buffer = AttributeBuffer::from_bytes(data, self.get_component_type(), self.get_num_components());
		self.point_to_att_val_map = Some(map);
		num_removed
	}
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ComponentDataType {
	I8,
	U8,
	I16,
	U16,
	I32,
	U32,
	I64,
	U64,
	F32,
	F64,
}

impl ComponentDataType {
	/// returns the size of the data type in bytes e.g. 4 for F32
	#[inline]
	pub fn size(self) -> usize {
        match self {
            ComponentDataType::F32 => 4,
            ComponentDataType::F64 => 8,
            ComponentDataType::U8 => 1,
            ComponentDataType::U16 => 2,
            ComponentDataType::U32 => 4,
            ComponentDataType::U64 => 8,
			ComponentDataType::I8 => 1,
			ComponentDataType::I16 => 2,
			ComponentDataType::I32 => 4,
			ComponentDataType::I64 => 8,
        }
    }
}

/// The semantic role of an attribute.
/// Besides the usual mesh attributes, it covers the per-splat parameters of 3D gaussian
/// splatting: opacity, scale, rotation, and the spherical harmonics coefficients split into
/// four bands (the DC term and the three rest bands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttributeType {
	Position,
	Normal,
	Color,
	TextureCoordinate,
	Opacity,
	Scale,
	Rotation,
	ShBand0,
	ShBand1,
	ShBand2,
	ShBand3,
}

impl AttributeType {
	/// The number of components the attribute is expected to have,
	/// or `None` if it varies (e.g. rgb or rgba colors).
	pub fn num_components(self) -> Option<usize> {
		match self {
			Self::Position => Some(3),
			Self::Normal => Some(3),
			Self::Color => None,
			Self::TextureCoordinate => Some(2),
			Self::Opacity => Some(1),
			Self::Scale => Some(3),
			Self::Rotation => Some(4),
			Self::ShBand0 => Some(3),
			Self::ShBand1 => Some(9),
			Self::ShBand2 => Some(15),
			Self::ShBand3 => Some(21),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AttributeId(usize);

impl AttributeId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the id of the attribute.
    pub fn as_usize(&self) -> usize {
        self.0
    }
}


#[cfg(test)]
mod tests {
    use super::*;

	#[test]
	fn test_attribute() {
		let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
		let att = Attribute::from_components(AttributeId::new(0), AttributeType::Position, 3, &data);
		assert_eq!(att.len(), 3);
		assert_eq!(att.get::<f32>(PointIdx::from(1)), vec![4.0, 5.0, 6.0]);
		assert_eq!(att.get_component_type(), ComponentDataType::F32);
		assert_eq!(att.get_num_components(), 3);
		assert_eq!(att.byte_stride(), 12);
		assert_eq!(att.get_attribute_type(), AttributeType::Position);
		assert!(att.is_identity_mapped());
	}

	#[test]
	fn test_random_write() {
		let mut att = Attribute::new_with_len(AttributeId::new(0), AttributeType::Color, ComponentDataType::U8, 2, 3);
		att.set_value(AttributeValueIdx::from(2), &[7u8, 8]);
		att.set_value(AttributeValueIdx::from(0), &[1u8, 2]);
		assert_eq!(att.unique_vals_as_components::<u8>(), vec![1, 2, 0, 0, 7, 8]);
		assert_eq!(att.get_as_bytes(PointIdx::from(2)), &[7, 8]);
	}

	#[test]
	fn test_remove_duplicate_values() {
		let positions = [
			0.0f32, 0.0, 0.0,  // point 0 (unique)
			1.0, 0.0, 0.0,     // point 1 (unique)
			0.5, 1.0, 0.0,     // point 2 (unique)
			0.0, 0.0, 0.0,     // point 3 (duplicate of point 0)
			1.0, 0.0, 0.0,     // point 4 (duplicate of point 1)
			2.0, 0.0, 0.0,     // point 5 (unique)
		];
		let mut att = Attribute::from_components(AttributeId::new(0), AttributeType::Position, 3, &positions);

		assert_eq!(att.remove_duplicate_values(), 2);
		assert_eq!(att.len(), 6);
		assert_eq!(att.num_unique_values(), 4);
		let map = (0..6).map(|p| usize::from(att.get_att_idx(PointIdx::from(p)))).collect::<Vec<_>>();
		assert_eq!(map, vec![0, 1, 2, 0, 1, 3]);
		assert_eq!(att.get::<f32>(PointIdx::from(5)), vec![2.0, 0.0, 0.0]);

		// running it again is a no-op
		assert_eq!(att.remove_duplicate_values(), 0);
		assert_eq!(att.num_unique_values(), 4);
	}

	#[test]
	fn test_remove_duplicate_values_is_bitwise() {
		// 0.0 and -0.0 compare equal as floats but differ in their bytes
		let mut att = Attribute::from_components(AttributeId::new(0), AttributeType::Opacity, 1, &[0.0f32, -0.0]);
		assert_eq!(att.remove_duplicate_values(), 0);
		assert_eq!(att.num_unique_values(), 2);
	}
}
