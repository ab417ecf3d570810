use std::io::Cursor;

/// Serializes `items` into CSV, with a header derived from the first item
pub fn serialize(items: impl Iterator<Item = impl serde::Serialize>) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for item in items {
        wtr.serialize(item)?
    }
    wtr.into_inner().map_err(|e| e.into_error().into())
}

/// Deserializes a CSV with a header row into `D`, one item per row
pub fn deserialize<'a, D: serde::de::DeserializeOwned + 'a>(
    data: &'a [u8],
) -> impl Iterator<Item = Result<D, csv::Error>> + 'a {
    let rdr = csv::ReaderBuilder::new()
        .delimiter(b',')
        .from_reader(Cursor::new(data));
    rdr.into_deserialize()
}

/// Returns the raw rows of a CSV after skipping its first `skip` rows.
/// Rows may have different lengths; quoted fields are unquoted and empty lines ignored.
/// Fields are bytes, so rows in another encoding than UTF-8 are still returned.
pub fn rows<'a>(
    data: &'a [u8],
    skip: usize,
) -> impl Iterator<Item = Result<csv::ByteRecord, csv::Error>> + 'a {
    let rdr = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(data));
    rdr.into_byte_records().skip(skip)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quoted_rows() {
        let data = b"title\nheader\n\"Korea, Republic of\",Solar,\"12\"\n\nDenmark,Wind\n";
        let rows = rows(data, 2).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], b"Korea, Republic of");
        assert_eq!(&rows[0][2], b"12");
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn latin1_rows() {
        let data = b"Denmark,Wind\nC\xf4te d'Ivoire,Solar\n";
        let rows = rows(data, 0).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], b"C\xf4te d'Ivoire");
    }
}
