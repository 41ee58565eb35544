//! Reads the PLY header and payload with `ply-rs` and regroups the payload into
//! per-property columns.
//!
//! Only `binary_little_endian` payloads are accepted. Each property keeps the raw
//! little-endian bytes of its values; list properties additionally keep the
//! `(offset, count)` of every entry, where `offset` counts values, not bytes.

use indexmap::IndexMap;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, ElementDef, Encoding, Property, PropertyDef, PropertyType, ScalarType};
use thiserror::Error;

use crate::core::attribute::ComponentDataType;
use crate::core::shared::DataValue;

fn component_type(ty: &ScalarType) -> ComponentDataType {
    match ty {
        ScalarType::Char => ComponentDataType::I8,
        ScalarType::UChar => ComponentDataType::U8,
        ScalarType::Short => ComponentDataType::I16,
        ScalarType::UShort => ComponentDataType::U16,
        ScalarType::Int => ComponentDataType::I32,
        ScalarType::UInt => ComponentDataType::U32,
        ScalarType::Float => ComponentDataType::F32,
        ScalarType::Double => ComponentDataType::F64,
    }
}

/// The PLY type name written to headers. PLY has no 64-bit integers, so those map to `None`.
pub fn data_type_name(ty: ComponentDataType) -> Option<&'static str> {
    match ty {
        ComponentDataType::I8 => Some("char"),
        ComponentDataType::U8 => Some("uchar"),
        ComponentDataType::I16 => Some("short"),
        ComponentDataType::U16 => Some("ushort"),
        ComponentDataType::I32 => Some("int"),
        ComponentDataType::U32 => Some("uint"),
        ComponentDataType::F32 => Some("float"),
        ComponentDataType::F64 => Some("double"),
        ComponentDataType::I64 | ComponentDataType::U64 => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlyProperty {
    name: String,
    /// type of the values (of the list entries, for list properties)
    data_type: ComponentDataType,
    /// type of the list counts; `None` for scalar properties
    list_data_type: Option<ComponentDataType>,
    data: Vec<u8>,
    list_data: Vec<(usize, usize)>,
}

impl PlyProperty {
    fn from_def(def: &PropertyDef) -> Self {
        let (data_type, list_data_type) = match &def.data_type {
            PropertyType::Scalar(ty) => (component_type(ty), None),
            PropertyType::List(count_ty, ty) => (component_type(ty), Some(component_type(count_ty))),
        };
        Self {
            name: def.name.clone(),
            data_type,
            list_data_type,
            data: Vec::new(),
            list_data: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> ComponentDataType {
        self.data_type
    }

    pub fn list_data_type(&self) -> Option<ComponentDataType> {
        self.list_data_type
    }

    pub fn is_list(&self) -> bool {
        self.list_data_type.is_some()
    }

    /// Raw little-endian bytes of all values.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `(offset, count)` of every list entry. Empty for scalar properties.
    pub fn list_data(&self) -> &[(usize, usize)] {
        &self.list_data
    }

    pub fn num_values(&self) -> usize {
        self.data.len() / self.data_type.size()
    }

    /// Smallest number of payload bytes one entry of this property can take.
    fn min_entry_len(&self) -> usize {
        self.list_data_type.unwrap_or(self.data_type).size()
    }

    fn push(&mut self, value: &Property) {
        match value {
            Property::Char(v) => v.write_to(&mut self.data),
            Property::UChar(v) => v.write_to(&mut self.data),
            Property::Short(v) => v.write_to(&mut self.data),
            Property::UShort(v) => v.write_to(&mut self.data),
            Property::Int(v) => v.write_to(&mut self.data),
            Property::UInt(v) => v.write_to(&mut self.data),
            Property::Float(v) => v.write_to(&mut self.data),
            Property::Double(v) => v.write_to(&mut self.data),
            Property::ListChar(l) => self.push_list(l),
            Property::ListUChar(l) => self.push_list(l),
            Property::ListShort(l) => self.push_list(l),
            Property::ListUShort(l) => self.push_list(l),
            Property::ListInt(l) => self.push_list(l),
            Property::ListUInt(l) => self.push_list(l),
            Property::ListFloat(l) => self.push_list(l),
            Property::ListDouble(l) => self.push_list(l),
        }
    }

    fn push_list<T: DataValue>(&mut self, values: &[T]) {
        self.list_data.push((self.num_values(), values.len()));
        for &v in values {
            v.write_to(&mut self.data);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlyElement {
    name: String,
    num_entries: usize,
    properties: IndexMap<String, PlyProperty>,
}

impl PlyElement {
    fn from_def(def: &ElementDef) -> Self {
        Self {
            name: def.name.clone(),
            num_entries: def.count,
            properties: def.properties.values()
                .map(|p| (p.name.clone(), PlyProperty::from_def(p)))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_entries(&self) -> usize {
        self.num_entries
    }

    pub fn get_property(&self, name: &str) -> Option<&PlyProperty> {
        self.properties.get(name)
    }

    /// Properties in header order.
    pub fn properties(&self) -> impl Iterator<Item = &PlyProperty> {
        self.properties.values()
    }

    fn min_entry_len(&self) -> usize {
        self.properties.values().map(PlyProperty::min_entry_len).sum()
    }

    fn fill(&mut self, rows: &[DefaultElement]) -> Result<(), Err> {
        for row in rows {
            for property in self.properties.values_mut() {
                let value = row.get(&property.name)
                    .ok_or_else(|| Err::NotEnoughData(self.name.clone()))?;
                property.push(value);
            }
        }
        Ok(())
    }
}

/// The elements of a PLY file, in header order, with their payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PlySchema {
    elements: IndexMap<String, PlyElement>,
}

impl PlySchema {
    pub fn get_element(&self, name: &str) -> Option<&PlyElement> {
        self.elements.get(name)
    }

    pub fn elements(&self) -> impl Iterator<Item = &PlyElement> {
        self.elements.values()
    }
}

pub struct PlyReader;

impl PlyReader {
    pub fn read(data: &[u8]) -> Result<PlySchema, Err> {
        if !data.starts_with(b"ply") {
            return Err(Err::MissingMagic);
        }

        let parser = Parser::<DefaultElement>::new();
        let mut reader = data;
        let header = parser.read_header(&mut reader)
            .map_err(|e| Err::InvalidHeader(e.to_string()))?;
        match header.encoding {
            Encoding::BinaryLittleEndian => {}
            Encoding::Ascii => return Err(Err::UnsupportedFormat("ascii".to_owned())),
            Encoding::BinaryBigEndian => return Err(Err::UnsupportedFormat("binary_big_endian".to_owned())),
        }

        let mut elements = IndexMap::new();
        for def in header.elements.values() {
            let mut element = PlyElement::from_def(def);
            let entry_len = element.min_entry_len();
            if entry_len == 0 {
                // nothing is stored for an element without properties
                tracing::debug!("element '{}' has no properties", def.name);
            } else {
                // the entry count is untrusted; bound it by what the rest of the payload can hold
                if def.count > reader.len() / entry_len {
                    return Err(Err::NotEnoughData(def.name.clone()));
                }
                let rows = parser.read_payload_for_element(&mut reader, def, &header)
                    .map_err(|_| Err::NotEnoughData(def.name.clone()))?;
                element.fill(&rows)?;
                tracing::trace!("read {} entries of element '{}'", rows.len(), def.name);
            }
            elements.insert(def.name.clone(), element);
        }
        if !reader.is_empty() {
            tracing::debug!("ignoring {} trailing bytes after the payload", reader.len());
        }

        Ok(PlySchema { elements })
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Err {
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("The data does not start with 'ply'.")]
    MissingMagic,
    #[error("The payload of element '{0}' is truncated.")]
    NotEnoughData(String),
    #[error("Unsupported format '{0}'; only binary_little_endian is supported.")]
    UnsupportedFormat(String),
}
