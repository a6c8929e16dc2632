//! The JSONL dictionary view of records.
//!
//! The interchange shape is one JSON object per record: a mapping from tag
//! text to the ordered list of that tag's field values, in first-appearance
//! order. Depending on the [`FieldMode`], each value is the raw field
//! string, an ordered list of `[key, value]` subfield pairs, or a
//! `{key: value}` object.
//!
//! ```json
//! {"1": ["testing"], "8": ["it"]}
//! {"260": [[["#", "1"], ["_", "Rio de Janeiro"], ["a", "1984"]]]}
//! ```
//!
//! Tag keys are plain decimal text: ISO tags are stripped of leading
//! zeros (`"001"` → `"1"`), master file tags are numeric already. Records
//! read from a master file may carry the reserved keys `mfn` and `active`
//! when enabled.
//!
//! Key order is semantically significant, so the crate relies on
//! `serde_json`'s `preserve_order` feature; objects iterate in insertion
//! order on both ends.

use crate::encoding::ByteEncoding;
use crate::error::{IsisError, Result};
use crate::leader::Geometry;
use crate::mst::MstRecord;
use crate::record::RawRecord;
use crate::subfield::SubfieldParser;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Reserved JSONL key for the master file number.
pub const MFN_KEY: &str = "mfn";
/// Reserved JSONL key for the record activity flag.
pub const ACTIVE_KEY: &str = "active";
/// Key carrying the 1-based occurrence index in numbered modes.
pub const NUMBER_KEY: &str = "#";

/// How field values appear in the dictionary view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldMode {
    /// The raw field string, subfields left inline.
    #[default]
    Field,
    /// An ordered list of `[key, value]` pairs; lossless.
    Pairs,
    /// A `{key: value}` object. Lossy: when a subfield key repeats inside
    /// one field, later values overwrite earlier ones.
    Nest,
}

/// Converts records to and from the JSONL dictionary view.
#[derive(Debug, Clone)]
pub struct Mapper {
    encoding: ByteEncoding,
    mode: FieldMode,
    number: bool,
    subfields: SubfieldParser,
    include_mfn: bool,
    include_active: bool,
}

impl Default for Mapper {
    fn default() -> Self {
        Mapper {
            encoding: ByteEncoding::default(),
            mode: FieldMode::default(),
            number: true,
            subfields: SubfieldParser::default(),
            include_mfn: false,
            include_active: false,
        }
    }
}

impl Mapper {
    /// Replace the payload encoding (default cp1252).
    #[must_use]
    pub fn with_encoding(mut self, encoding: ByteEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Replace the field value mode (default [`FieldMode::Field`]).
    #[must_use]
    pub fn with_mode(mut self, mode: FieldMode) -> Self {
        self.mode = mode;
        self
    }

    /// Control the `#` occurrence numbering in `pairs`/`nest` modes
    /// (default on).
    #[must_use]
    pub fn with_number(mut self, number: bool) -> Self {
        self.number = number;
        self
    }

    /// Replace the subfield parser.
    #[must_use]
    pub fn with_subfields(mut self, subfields: SubfieldParser) -> Self {
        self.subfields = subfields;
        self
    }

    /// Emit the reserved `mfn` key on master file records (default off).
    #[must_use]
    pub fn with_mfn(mut self, include: bool) -> Self {
        self.include_mfn = include;
        self
    }

    /// Emit the reserved `active` key on master file records (default off).
    #[must_use]
    pub fn with_active(mut self, include: bool) -> Self {
        self.include_active = include;
        self
    }

    /// Build the dictionary view of an ISO record.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Encoding`] when a tag or value cannot be
    /// decoded under the configured encoding.
    pub fn record_to_value(&self, record: &RawRecord) -> Result<Value> {
        let mut dict: IndexMap<String, Vec<Value>> = IndexMap::new();
        for field in &record.fields {
            let tag = iso_tag_text(&field.tag, &self.encoding)?;
            let values = dict.entry(tag).or_default();
            let occurrence = values.len() + 1;
            values.push(self.field_value(&field.value, occurrence)?);
        }
        Ok(dict_to_value(dict, None))
    }

    /// Build the dictionary view of a master file record, with the
    /// reserved `mfn`/`active` keys when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Encoding`] when a value cannot be decoded
    /// under the configured encoding.
    pub fn mst_to_value(&self, record: &MstRecord) -> Result<Value> {
        let mut dict: IndexMap<String, Vec<Value>> = IndexMap::new();
        for (tag, value) in &record.fields {
            let values = dict.entry(tag.to_string()).or_default();
            let occurrence = values.len() + 1;
            values.push(self.field_value(value, occurrence)?);
        }
        let reserved = (
            self.include_mfn.then_some(record.mfn),
            self.include_active.then_some(record.active),
        );
        Ok(dict_to_value(dict, Some(reserved)))
    }

    /// Convert a JSONL object back to an ISO build input.
    ///
    /// Tags are zero-padded to the geometry's tag width; the reserved
    /// `mfn`/`active` keys are ignored; `pairs`/`nest` values are joined
    /// through the subfield parser (dropping `#` entries).
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Overflow`] when the value does not have the
    /// shape this mapper's mode expects, or a tag does not fit the
    /// geometry, and [`IsisError::Encoding`] for unmappable text.
    pub fn value_to_record(&self, value: &Value, geom: &Geometry) -> Result<RawRecord> {
        let object = value
            .as_object()
            .ok_or_else(|| IsisError::Overflow("JSONL record is not an object".to_string()))?;

        let mut record = RawRecord::new(geom);
        for (key, values) in object {
            if key == MFN_KEY || key == ACTIVE_KEY {
                continue;
            }
            let tag = build_tag(key, geom, &self.encoding)?;
            let values = values.as_array().ok_or_else(|| {
                IsisError::Overflow(format!("values of tag {key} are not an array"))
            })?;
            for value in values {
                record.push(tag.clone(), self.field_bytes(key, value)?);
            }
        }
        Ok(record)
    }

    fn field_value(&self, raw: &[u8], occurrence: usize) -> Result<Value> {
        match self.mode {
            FieldMode::Field => Ok(Value::String(self.encoding.decode(raw)?)),
            FieldMode::Pairs => {
                let mut pairs = Vec::new();
                if self.number {
                    pairs.push(pair_value(NUMBER_KEY, &occurrence.to_string()));
                }
                for (key, value) in self.subfields.parse(raw) {
                    pairs.push(pair_value(
                        &self.encoding.decode(&[key])?,
                        &self.encoding.decode(&value)?,
                    ));
                }
                Ok(Value::Array(pairs))
            }
            FieldMode::Nest => {
                let mut object = Map::new();
                if self.number {
                    object.insert(
                        NUMBER_KEY.to_string(),
                        Value::String(occurrence.to_string()),
                    );
                }
                for (key, value) in self.subfields.parse(raw) {
                    object.insert(
                        self.encoding.decode(&[key])?,
                        Value::String(self.encoding.decode(&value)?),
                    );
                }
                Ok(Value::Object(object))
            }
        }
    }

    fn field_bytes(&self, tag: &str, value: &Value) -> Result<Vec<u8>> {
        match self.mode {
            FieldMode::Field => {
                let text = value.as_str().ok_or_else(|| {
                    IsisError::Overflow(format!("field value of tag {tag} is not a string"))
                })?;
                self.encoding.encode(text)
            }
            FieldMode::Pairs => {
                let items = value.as_array().ok_or_else(|| {
                    IsisError::Overflow(format!("pairs value of tag {tag} is not an array"))
                })?;
                let mut pairs = Vec::with_capacity(items.len());
                for item in items {
                    let pair = item.as_array().filter(|pair| pair.len() == 2).ok_or_else(
                        || {
                            IsisError::Overflow(format!(
                                "subfield of tag {tag} is not a [key, value] pair"
                            ))
                        },
                    )?;
                    let (key, value) = (expect_str(tag, &pair[0])?, expect_str(tag, &pair[1])?);
                    if key == NUMBER_KEY {
                        continue;
                    }
                    pairs.push((self.subfield_key(tag, key)?, self.encoding.encode(value)?));
                }
                self.subfields.unparse(&pairs)
            }
            FieldMode::Nest => {
                let object = value.as_object().ok_or_else(|| {
                    IsisError::Overflow(format!("nest value of tag {tag} is not an object"))
                })?;
                let mut pairs = Vec::with_capacity(object.len());
                for (key, value) in object {
                    if key == NUMBER_KEY {
                        continue;
                    }
                    let value = expect_str(tag, value)?;
                    pairs.push((self.subfield_key(tag, key)?, self.encoding.encode(value)?));
                }
                self.subfields.unparse(&pairs)
            }
        }
    }

    fn subfield_key(&self, tag: &str, key: &str) -> Result<u8> {
        let bytes = self.encoding.encode(key)?;
        match bytes.as_slice() {
            [byte] => Ok(*byte),
            _ => Err(IsisError::Overflow(format!(
                "subfield key {key:?} of tag {tag} is not a single byte"
            ))),
        }
    }
}

fn pair_value(key: &str, value: &str) -> Value {
    Value::Array(vec![
        Value::String(key.to_string()),
        Value::String(value.to_string()),
    ])
}

fn expect_str<'a>(tag: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        IsisError::Overflow(format!("subfield value of tag {tag} is not a string"))
    })
}

fn dict_to_value(
    dict: IndexMap<String, Vec<Value>>,
    reserved: Option<(Option<u32>, Option<bool>)>,
) -> Value {
    let mut object = Map::new();
    if let Some((mfn, active)) = reserved {
        if let Some(mfn) = mfn {
            object.insert(MFN_KEY.to_string(), Value::Number(mfn.into()));
        }
        if let Some(active) = active {
            object.insert(ACTIVE_KEY.to_string(), Value::Bool(active));
        }
    }
    for (tag, values) in dict {
        object.insert(tag, Value::Array(values));
    }
    Value::Object(object)
}

/// Tag text of an ISO directory tag: leading zeros stripped, all-zero
/// tags collapse to `"0"`.
fn iso_tag_text(tag: &[u8], encoding: &ByteEncoding) -> Result<String> {
    let text = encoding.decode(tag)?;
    let stripped = text.trim_start_matches('0');
    Ok(if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    })
}

/// Zero-pad a tag key to the geometry's tag width.
fn build_tag(key: &str, geom: &Geometry, encoding: &ByteEncoding) -> Result<Vec<u8>> {
    let bytes = encoding.encode(key)?;
    if bytes.is_empty() || bytes.len() > geom.tag_len {
        return Err(IsisError::Overflow(format!(
            "tag {key:?} does not fit {} bytes",
            geom.tag_len
        )));
    }
    let mut tag = vec![b'0'; geom.tag_len - bytes.len()];
    tag.extend_from_slice(&bytes);
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> RawRecord {
        let geom = Geometry::default();
        let mut record = RawRecord::new(&geom);
        record.push_str("001", "testing");
        record.push_str("008", "it");
        record
    }

    #[test]
    fn field_mode_strips_tag_zeros() {
        let mapper = Mapper::default();
        let value = mapper.record_to_value(&sample_record()).unwrap();
        assert_eq!(value, json!({"1": ["testing"], "8": ["it"]}));
    }

    #[test]
    fn all_zero_tag_becomes_zero() {
        let geom = Geometry::default();
        let mut record = RawRecord::new(&geom);
        record.push_str("000", "data");
        let value = Mapper::default().record_to_value(&record).unwrap();
        assert_eq!(value, json!({"0": ["data"]}));
    }

    #[test]
    fn key_order_is_first_appearance() {
        let geom = Geometry::default();
        let mut record = RawRecord::new(&geom);
        record.push_str("900", "a");
        record.push_str("100", "b");
        record.push_str("900", "c");
        let value = Mapper::default().record_to_value(&record).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["900", "100"]);
        assert_eq!(value["900"], json!(["a", "c"]));
    }

    #[test]
    fn pairs_mode_numbers_occurrences() {
        let geom = Geometry::default();
        let mut record = RawRecord::new(&geom);
        record.push_str("260", "Rio^a1984");
        record.push_str("260", "SP^a1985");
        let mapper = Mapper::default().with_mode(FieldMode::Pairs);
        let value = mapper.record_to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"260": [
                [["#", "1"], ["_", "Rio"], ["a", "1984"]],
                [["#", "2"], ["_", "SP"], ["a", "1985"]],
            ]})
        );
    }

    #[test]
    fn nest_mode_without_numbering() {
        let geom = Geometry::default();
        let mut record = RawRecord::new(&geom);
        record.push_str("260", "Rio^a1984");
        let mapper = Mapper::default()
            .with_mode(FieldMode::Nest)
            .with_number(false);
        let value = mapper.record_to_value(&record).unwrap();
        assert_eq!(value, json!({"260": [{"_": "Rio", "a": "1984"}]}));
    }

    #[test]
    fn nest_mode_repeated_key_keeps_last() {
        let geom = Geometry::default();
        let mut record = RawRecord::new(&geom);
        record.push_str("100", "^aone^atwo");
        let mapper = Mapper::default()
            .with_mode(FieldMode::Nest)
            .with_number(false);
        let value = mapper.record_to_value(&record).unwrap();
        assert_eq!(value, json!({"100": [{"a": "two"}]}));
    }

    #[test]
    fn value_to_record_pads_tags() {
        let geom = Geometry::default();
        let mapper = Mapper::default();
        let record = mapper
            .value_to_record(&json!({"1": ["testing"], "8": ["it"]}), &geom)
            .unwrap();
        assert_eq!(record, sample_record());
    }

    #[test]
    fn value_to_record_ignores_reserved_keys() {
        let geom = Geometry::default();
        let mapper = Mapper::default();
        let record = mapper
            .value_to_record(
                &json!({"mfn": 4, "active": true, "1": ["x"]}),
                &geom,
            )
            .unwrap();
        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.fields[0].tag, b"001");
    }

    #[test]
    fn pairs_roundtrip_through_value() {
        let geom = Geometry::default();
        let mapper = Mapper::default().with_mode(FieldMode::Pairs);
        let record = sample_subfield_record();
        let value = mapper.record_to_value(&record).unwrap();
        let back = mapper.value_to_record(&value, &geom).unwrap();
        assert_eq!(back.fields, record.fields);
    }

    fn sample_subfield_record() -> RawRecord {
        let geom = Geometry::default();
        let mut record = RawRecord::new(&geom);
        record.push_str("260", "Rio^a1984^bVozes");
        record.push_str("260", "plain");
        record
    }

    #[test]
    fn mst_record_with_reserved_keys() {
        let record = MstRecord {
            mfn: 7,
            status: 0,
            active: true,
            locked: false,
            fields: vec![(26, b"Rio".to_vec()), (26, b"SP".to_vec())],
        };
        let mapper = Mapper::default().with_mfn(true).with_active(true);
        let value = mapper.mst_to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"mfn": 7, "active": true, "26": ["Rio", "SP"]})
        );
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["mfn", "active", "26"]);
    }

    #[test]
    fn wrong_shape_is_overflow() {
        let geom = Geometry::default();
        let mapper = Mapper::default();
        assert!(matches!(
            mapper.value_to_record(&json!(["not", "an", "object"]), &geom),
            Err(IsisError::Overflow(_))
        ));
        assert!(matches!(
            mapper.value_to_record(&json!({"1": "not-an-array"}), &geom),
            Err(IsisError::Overflow(_))
        ));
    }

    #[test]
    fn oversized_tag_is_overflow() {
        let geom = Geometry::default();
        let mapper = Mapper::default();
        assert!(mapper
            .value_to_record(&json!({"1234": ["x"]}), &geom)
            .is_err());
    }
}
