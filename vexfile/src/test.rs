use super::*;

#[test]
fn write_read_round_trips() {
    let path = "milo832_vexfile_write_read_round_trips.vex";
    let words = vec![0x1122_3344_5566_7788, 0, u64::MAX];

    write_file(path, &words).unwrap();
    let read_back = read_file(path).unwrap();

    assert_eq!(words, read_back);

    std::fs::remove_file(path).unwrap();
}

#[test]
fn read_rejects_bad_magic() {
    let mut buf = Vec::new();
    buf.write_u32::<Endian>(0xDEAD_BEEF).unwrap();
    buf.write_u32::<Endian>(VERSION).unwrap();
    buf.write_u32::<Endian>(0).unwrap();

    let err = read(&mut &buf[..]).unwrap_err();
    assert_eq!(err, VexError::BadMagic(0xDEAD_BEEF));
}

#[test]
fn read_rejects_unsupported_version() {
    let mut buf = Vec::new();
    buf.write_u32::<Endian>(MAGIC).unwrap();
    buf.write_u32::<Endian>(99).unwrap();
    buf.write_u32::<Endian>(0).unwrap();

    let err = read(&mut &buf[..]).unwrap_err();
    assert_eq!(err, VexError::UnsupportedVersion(99));
}

#[test]
fn hex_dump_round_trips_through_parse() {
    let words = vec![0, 1, 0xABCD_EF01_2345_6789, u64::MAX];
    let text = hex_dump(&words);
    assert_eq!(text, "0000000000000000\n0000000000000001\nABCDEF0123456789\nFFFFFFFFFFFFFFFF\n");
    assert_eq!(parse_hex_dump(&text).unwrap(), words);
}

#[test]
fn parse_hex_dump_skips_blank_lines() {
    let words = parse_hex_dump("0000000000000001\n\n0000000000000002\n").unwrap();
    assert_eq!(words, vec![1, 2]);
}

#[test]
fn parse_hex_dump_reports_malformed_line() {
    let err = parse_hex_dump("not_hex").unwrap_err();
    assert_eq!(err.line, 1);
}