//! Tree body encoding.
//!
//! The body carries no header or length prefix; the store adds the
//! `tree <len>\0` header when hashing. Each record is
//! `mode SP name NUL id[20]`, concatenated in canonical order.

use std::cmp::Ordering;

use arbor_types::{ObjectId, OBJECT_ID_LEN};

use crate::entry::{self, validate_name, TreeEntry};
use crate::error::{TreeError, TreeResult};
use crate::mode::FileMode;

/// Longest mode string we accept (`"160000"`).
const MAX_MODE_DIGITS: usize = 6;

/// Decode a tree body into its entries.
///
/// The input must be a canonical encoding: supported minimal octal modes,
/// valid names, complete identities, and names strictly increasing in
/// canonical order with no name repeated under a different mode.
pub fn decode(data: &[u8]) -> TreeResult<Vec<TreeEntry>> {
    let mut entries: Vec<TreeEntry> = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let record_start = pos;

        let space = data[pos..]
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| corrupt(pos, "missing space after mode"))?;
        let mode = parse_mode(&data[pos..pos + space], pos)?;
        pos += space + 1;

        let nul = data[pos..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| corrupt(pos, "unterminated entry name"))?;
        let name = &data[pos..pos + nul];
        validate_name(name).map_err(|e| corrupt(pos, e.to_string()))?;
        pos += nul + 1;

        if data.len() - pos < OBJECT_ID_LEN {
            return Err(corrupt(
                pos,
                format!(
                    "truncated object id: {} of {OBJECT_ID_LEN} bytes",
                    data.len() - pos
                ),
            ));
        }
        let id = ObjectId::from_slice(&data[pos..pos + OBJECT_ID_LEN])
            .map_err(|e| corrupt(pos, e.to_string()))?;
        pos += OBJECT_ID_LEN;

        let entry = TreeEntry {
            mode,
            name: name.to_vec(),
            id,
        };

        if entry::find(&entries, name).is_some() {
            return Err(corrupt(
                record_start,
                format!("duplicate entry name {:?}", entry.display_name()),
            ));
        }
        if let Some(prev) = entries.last() {
            if prev.canonical_cmp(&entry) != Ordering::Less {
                return Err(corrupt(
                    record_start,
                    format!(
                        "entry {:?} sorts before {:?}",
                        entry.display_name(),
                        prev.display_name()
                    ),
                ));
            }
        }
        entries.push(entry);
    }

    Ok(entries)
}

/// Encode entries into a tree body.
///
/// `entries` must already be in canonical order; [`Tree`](crate::Tree)
/// guarantees that for its own entries.
pub fn encode(entries: &[TreeEntry]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(entries));
    for entry in entries {
        buf.extend_from_slice(entry.mode.as_octal());
        buf.push(b' ');
        buf.extend_from_slice(&entry.name);
        buf.push(0);
        buf.extend_from_slice(entry.id.as_bytes());
    }
    buf
}

/// Exact size of `encode(entries)`.
pub fn encoded_len(entries: &[TreeEntry]) -> usize {
    entries
        .iter()
        .map(|e| e.mode.as_octal().len() + 1 + e.name.len() + 1 + OBJECT_ID_LEN)
        .sum()
}

fn parse_mode(digits: &[u8], offset: usize) -> TreeResult<FileMode> {
    if digits.is_empty() {
        return Err(corrupt(offset, "empty mode"));
    }
    if digits.len() > MAX_MODE_DIGITS {
        return Err(corrupt(offset, "mode too long"));
    }
    if digits[0] == b'0' {
        return Err(corrupt(offset, "mode has a leading zero"));
    }
    let mut bits = 0u32;
    for &d in digits {
        if !(b'0'..=b'7').contains(&d) {
            return Err(corrupt(offset, format!("non-octal mode byte {d:#04x}")));
        }
        bits = bits * 8 + u32::from(d - b'0');
    }
    FileMode::from_mode_bits(bits)
        .ok_or_else(|| corrupt(offset, format!("unsupported mode {bits:o}")))
}

fn corrupt(offset: usize, reason: impl Into<String>) -> TreeError {
    TreeError::Corrupt {
        offset,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(n: u8) -> ObjectId {
        ObjectId::from_hash([n; 20])
    }

    fn record(mode: &str, name: &[u8], id: ObjectId) -> Vec<u8> {
        let mut buf = mode.as_bytes().to_vec();
        buf.push(b' ');
        buf.extend_from_slice(name);
        buf.push(0);
        buf.extend_from_slice(id.as_bytes());
        buf
    }

    fn assert_corrupt(data: &[u8]) -> (usize, String) {
        match decode(data) {
            Err(TreeError::Corrupt { offset, reason }) => (offset, reason),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // Decode
    // -----------------------------------------------------------------------

    #[test]
    fn decodes_file_and_subtree() {
        let mut data = record("100644", b"a.txt", id(1));
        data.extend(record("40000", b"sub", id(2)));

        let entries = decode(&data).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name(), b"a.txt");
        assert_eq!(entries[0].attributes(), 0o100644);
        assert_eq!(entries[0].id(), &id(1));
        assert_eq!(entries[1].name(), b"sub");
        assert_eq!(entries[1].mode(), FileMode::Directory);
    }

    #[test]
    fn empty_body_is_empty_tree() {
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn decodes_every_mode() {
        let mut data = Vec::new();
        for (i, mode) in ["100644", "100755", "120000", "160000", "40000"]
            .iter()
            .enumerate()
        {
            data.extend(record(mode, format!("e{i}").as_bytes(), id(i as u8)));
        }
        let entries = decode(&data).unwrap();
        let modes: Vec<_> = entries.iter().map(|e| e.mode()).collect();
        assert_eq!(
            modes,
            vec![
                FileMode::Regular,
                FileMode::Executable,
                FileMode::Symlink,
                FileMode::Gitlink,
                FileMode::Directory,
            ]
        );
    }

    #[test]
    fn rejects_out_of_order_records() {
        let mut data = record("100644", b"b", id(1));
        data.extend(record("100644", b"a", id(2)));
        let (offset, reason) = assert_corrupt(&data);
        assert_eq!(offset, record("100644", b"b", id(1)).len());
        assert!(reason.contains("sorts before"));
    }

    #[test]
    fn rejects_directory_placed_by_plain_name_order() {
        // Plain byte order puts "foo" before "foo-bar"; the directory rule
        // puts "foo/" after it.
        let mut data = record("40000", b"foo", id(1));
        data.extend(record("100644", b"foo-bar", id(2)));
        assert_corrupt(&data);

        let mut data = record("100644", b"foo-bar", id(2));
        data.extend(record("40000", b"foo", id(1)));
        assert_eq!(decode(&data).unwrap().len(), 2);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut data = record("100644", b"same", id(1));
        data.extend(record("100644", b"same", id(2)));
        assert_corrupt(&data);
    }

    #[test]
    fn rejects_same_name_as_file_and_directory() {
        let mut data = record("100644", b"foo", id(1));
        data.extend(record("100644", b"foo-bar", id(2)));
        data.extend(record("40000", b"foo", id(3)));
        let (_, reason) = assert_corrupt(&data);
        assert!(reason.contains("duplicate"));
    }

    #[test]
    fn rejects_bad_modes() {
        for mode in ["", "100648", "10064x", "040000", "100664", "0", "1006440"] {
            let data = record(mode, b"f", id(1));
            let (offset, _) = assert_corrupt(&data);
            assert_eq!(offset, 0, "mode {mode:?}");
        }
    }

    #[test]
    fn rejects_missing_space() {
        assert_corrupt(b"100644");
    }

    #[test]
    fn rejects_empty_name() {
        let data = record("100644", b"", id(1));
        let (offset, _) = assert_corrupt(&data);
        assert_eq!(offset, 7);
    }

    #[test]
    fn rejects_name_with_slash() {
        assert_corrupt(&record("100644", b"a/b", id(1)));
    }

    #[test]
    fn rejects_unterminated_name() {
        assert_corrupt(b"100644 name-without-nul");
    }

    #[test]
    fn rejects_truncated_id() {
        let mut data = record("100644", b"f", id(1));
        data.truncate(data.len() - 1);
        let (_, reason) = assert_corrupt(&data);
        assert!(reason.contains("19 of 20"));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut data = record("100644", b"f", id(1));
        data.extend_from_slice(b"1");
        assert_corrupt(&data);
    }

    // -----------------------------------------------------------------------
    // Encode
    // -----------------------------------------------------------------------

    #[test]
    fn encode_writes_minimal_modes() {
        let entries = vec![
            TreeEntry::new(FileMode::Regular, "a.txt", id(1)).unwrap(),
            TreeEntry::new(FileMode::Directory, "sub", id(2)).unwrap(),
        ];
        let mut expected = record("100644", b"a.txt", id(1));
        expected.extend(record("40000", b"sub", id(2)));
        assert_eq!(encode(&entries), expected);
        assert_eq!(encoded_len(&entries), expected.len());
    }

    #[test]
    fn encode_of_nothing_is_empty() {
        assert!(encode(&[]).is_empty());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn arb_entries() -> impl Strategy<Value = Vec<TreeEntry>> {
        let name = proptest::collection::vec(
            any::<u8>().prop_filter("no NUL or slash", |b| *b != 0 && *b != b'/'),
            1..8,
        );
        let mode = proptest::sample::select(FileMode::ALL.to_vec());
        let raw = proptest::collection::vec((mode, name, any::<u8>()), 0..24);
        raw.prop_map(|items| {
            let mut entries: Vec<TreeEntry> = Vec::new();
            for (mode, name, n) in items {
                if entry::find(&entries, &name).is_some() {
                    continue;
                }
                let e = TreeEntry::new(mode, &name, id(n)).unwrap();
                let at = entry::insertion_point(&entries, &e).unwrap();
                entries.insert(at, e);
            }
            entries
        })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(entries in arb_entries()) {
            let bytes = encode(&entries);
            let decoded = decode(&bytes).unwrap();
            prop_assert_eq!(&decoded, &entries);
            prop_assert_eq!(encode(&decoded), bytes);
        }

        #[test]
        fn decode_never_panics(data in proptest::collection::vec(any::<u8>(), 0..128)) {
            let _ = decode(&data);
        }
    }
}
