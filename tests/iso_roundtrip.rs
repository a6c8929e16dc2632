//! End-to-end ISO 2709 build/parse scenarios, including the wrap layer and
//! the JSONL dictionary view.

use isisio::{
    build_record, parse_record, FieldMode, Geometry, IsoReader, IsoWriter, LineSpec, Mapper,
    RawField, RawRecord, Result,
};
use serde_json::json;
use std::io::Cursor;

fn build_jsonl(value: &serde_json::Value, geom: &Geometry) -> Vec<u8> {
    let mapper = Mapper::default();
    let record = mapper.value_to_record(value, geom).unwrap();
    build_record(geom, &record).unwrap()
}

#[test]
fn dict_record_with_defaults() {
    let geom = Geometry::default();
    let bytes = build_jsonl(&json!({"1": ["testing"], "8": ["it"]}), &geom);
    let mut expected = b"000610000000000490004500001000800000008000300008#testing#it##".to_vec();
    assert_eq!(bytes, expected);
    expected.push(b'\n');
    assert_eq!(LineSpec::default().wrap(&bytes), expected);
}

#[test]
fn low_level_record_with_defaults() {
    let geom = Geometry::default();
    let mut record = RawRecord::new(&geom);
    record.push_str("001", "a");
    record.push_str("555", "test");
    assert_eq!(
        build_record(&geom, &record).unwrap(),
        b"000570000000000490004500001000200000555000500002#a#test##".to_vec()
    );
}

#[test]
fn custom_entry_map_with_custom_bytes() {
    let geom = Geometry {
        len_len: 1,
        pos_len: 3,
        custom_len: 1,
        ..Geometry::default()
    };
    let mut record = RawRecord::new(&geom);
    record.fields.push(RawField {
        tag: b"001".to_vec(),
        value: b"a".to_vec(),
        custom: b"X".to_vec(),
    });
    record.push_str("555", "test");

    let bytes = build_record(&geom, &record).unwrap();
    assert_eq!(bytes, b"0004900000000004100013100012000X55550020#a#test##".to_vec());

    let (parsed, _) = parse_record(&geom, &bytes).unwrap();
    assert_eq!(parsed.fields[0].custom, b"X");
    assert_eq!(parsed.fields[1].custom, b"0");
    assert_eq!(build_record(&geom, &parsed).unwrap(), bytes);
}

#[test]
fn embedded_newlines_without_wrapping() {
    let geom = Geometry::default();
    let bytes = build_jsonl(
        &json!({"SIZ": ["linux^c\n^s1", "win^c\r\n^s2", "mac^c\r^s1"]}),
        &geom,
    );
    assert_eq!(
        bytes,
        b"000950000000000610004500SIZ001200000SIZ001100012SIZ001000023#linux^c\n^s1#win^c\r\n^s2#mac^c\r^s1##".to_vec()
    );

    let (record, consumed) = parse_record(&geom, &bytes).unwrap();
    assert_eq!(consumed, 95);
    assert_eq!(record.fields[1].value, b"win^c\r\n^s2");
    assert_eq!(build_record(&geom, &record).unwrap(), bytes);
}

#[test]
fn embedded_newlines_roundtrip_under_default_wrap() {
    let geom = Geometry::default();
    let mut record = RawRecord::new(&geom);
    record.push_str("SIZ", "linux^c\n^s1");
    record.push_str("SIZ", "win^c\r\n^s2");
    record.push_str("SIZ", "mac^c\r^s1");

    let mut out = Vec::new();
    let mut writer = IsoWriter::new(&mut out);
    writer.write_record(&record).unwrap();
    writer.finish().unwrap();
    drop(writer);

    let mut reader = IsoReader::new(Cursor::new(out));
    let parsed = reader.read_record().unwrap().unwrap();
    assert_eq!(parsed.fields, record.fields);
    assert!(reader.read_record().unwrap().is_none());
}

#[test]
fn custom_terminators_and_line_len() {
    let geom = Geometry {
        field_terminator: b';',
        record_terminator: b'@',
        ..Geometry::default()
    };
    let lines = LineSpec {
        line_len: 20,
        newline: b"\n".to_vec(),
    };
    let mapper = Mapper::default();
    let record = mapper
        .value_to_record(
            &json!({"OBJ": ["mouse", "keyboard"], "INF": ["old"], "SIZ": ["34"]}),
            &geom,
        )
        .unwrap();

    let bytes = build_record(&geom, &record).unwrap();
    assert_eq!(bytes.len(), 96);

    let wrapped = lines.wrap(&bytes);
    assert_eq!(wrapped.len(), 96 + 5);
    assert_eq!(wrapped.iter().filter(|&&b| b == b'\n').count(), 5);

    let mut reader = IsoReader::new(Cursor::new(wrapped))
        .with_geometry(geom.clone())
        .with_lines(lines);
    let parsed = reader.read_record().unwrap().unwrap();
    assert_eq!(build_record(&geom, &parsed).unwrap(), bytes);

    let tags: Vec<&[u8]> = parsed.fields.iter().map(|f| f.tag.as_slice()).collect();
    assert_eq!(tags, vec![b"OBJ".as_slice(), b"OBJ", b"INF", b"SIZ"]);
}

#[test]
fn concatenated_records_parse_in_order() {
    let geom = Geometry::default();
    let mut stream = Vec::new();
    let mut writer = IsoWriter::new(&mut stream);
    for idx in 0..5 {
        let mut record = RawRecord::new(&geom);
        record.push_str("001", &format!("record-{idx}"));
        writer.write_record(&record).unwrap();
    }
    writer.finish().unwrap();
    drop(writer);

    let mut reader = IsoReader::new(Cursor::new(stream));
    let records: Vec<_> = reader.records().collect::<Result<_>>().unwrap();
    assert_eq!(records.len(), 5);
    for (idx, record) in records.iter().enumerate() {
        assert_eq!(record.fields[0].value, format!("record-{idx}").as_bytes());
    }
}

#[test]
fn long_record_wraps_at_80_columns() {
    let geom = Geometry::default();
    let mut record = RawRecord::new(&geom);
    record.push_str("100", &"x".repeat(300));

    let mut out = Vec::new();
    let mut writer = IsoWriter::new(&mut out);
    writer.write_record(&record).unwrap();
    writer.finish().unwrap();
    drop(writer);

    // Every full 80-content-byte line ends with a newline.
    assert_eq!(&out[80..81], b"\n");
    assert_eq!(&out[161..162], b"\n");
    assert_eq!(out.last(), Some(&b'\n'));

    let mut reader = IsoReader::new(Cursor::new(out));
    let parsed = reader.read_record().unwrap().unwrap();
    assert_eq!(parsed.fields[0].value.len(), 300);
    assert!(reader.read_record().unwrap().is_none());
}

#[test]
fn jsonl_roundtrip_in_field_mode() {
    let geom = Geometry::default();
    let mapper = Mapper::default();
    let value = json!({"1": ["testing"], "8": ["it", "again"], "500": ["^anote"]});
    let record = mapper.value_to_record(&value, &geom).unwrap();
    let bytes = build_record(&geom, &record).unwrap();
    let (parsed, _) = parse_record(&geom, &bytes).unwrap();
    assert_eq!(mapper.record_to_value(&parsed).unwrap(), value);
}

#[test]
fn jsonl_roundtrip_in_pairs_mode() {
    let geom = Geometry::default();
    let mapper = Mapper::default().with_mode(FieldMode::Pairs);
    let mut record = RawRecord::new(&geom);
    record.push_str("260", "Rio de Janeiro^aEditora^b1984");
    record.push_str("260", "plain text");

    let value = mapper.record_to_value(&record).unwrap();
    assert_eq!(
        value,
        json!({"260": [
            [["#", "1"], ["_", "Rio de Janeiro"], ["a", "Editora"], ["b", "1984"]],
            [["#", "2"], ["_", "plain text"]],
        ]})
    );
    let back = mapper.value_to_record(&value, &geom).unwrap();
    assert_eq!(back.fields, record.fields);
}

#[test]
fn geometry_overflow_scenarios() {
    let tight = Geometry {
        len_len: 1,
        ..Geometry::default()
    };
    let mut record = RawRecord::new(&tight);
    record.push_str("001", "0123456789");
    assert!(build_record(&tight, &record).is_err());

    let geom = Geometry::default();
    let mut record = RawRecord::new(&geom);
    record.push_str("001", "with#terminator");
    assert!(build_record(&geom, &record).is_err());
}
