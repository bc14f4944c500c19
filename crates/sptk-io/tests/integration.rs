//! Integration tests for sptk-io: file-backed streams.

use std::io::Write;

use sptk_io::{
    DataType, Error, RecordReader, ValueReader, open_input, open_output, parse_type_pair,
    read_all, write_record,
};
use tempfile::NamedTempFile;

#[test]
fn records_survive_a_file_round_trip() {
    let file = NamedTempFile::new().unwrap();
    {
        let mut out = open_output(Some(file.path())).unwrap();
        for frame in 0..4 {
            let record: Vec<f64> = (0..3).map(|i| (frame * 3 + i) as f64 * 0.5).collect();
            write_record(&mut out, DataType::Double, &record, false).unwrap();
        }
        out.flush().unwrap();
    }

    let mut reader = RecordReader::new(open_input(Some(file.path())).unwrap(), DataType::Double, 3);
    let mut record = Vec::new();
    let mut frames = Vec::new();
    while reader.next_record(&mut record).unwrap() {
        frames.push(record.clone());
    }
    assert_eq!(frames.len(), 4);
    assert_eq!(frames[3], vec![4.5, 5.0, 5.5]);
}

#[test]
fn x2x_style_conversion_through_files() {
    let (from, to) = parse_type_pair("+as").unwrap();
    let mut input = NamedTempFile::new().unwrap();
    writeln!(input, "1.4 -2.6 40000").unwrap();
    writeln!(input, "-40000").unwrap();

    let values = read_all(open_input(Some(input.path())).unwrap(), from).unwrap();
    let mut bytes = Vec::new();
    write_record(&mut bytes, to, &values, true).unwrap();
    assert_eq!(bytes.len(), 4 * to.size());

    let mut reader = ValueReader::new(bytes.as_slice(), to);
    let mut decoded = Vec::new();
    reader.read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, vec![1.0, -3.0, 32767.0, -32768.0]);
}

#[test]
fn missing_file_reports_path() {
    let err = open_input(Some(std::path::Path::new("/definitely/not/here.bin"))).err();
    let Some(err) = err else {
        panic!("expected an open error");
    };
    assert!(matches!(err, Error::Open { .. }));
    assert!(err.to_string().contains("/definitely/not/here.bin"));
}
