use proptest::prelude::*;
use proptest::sample::Index;
use simple_patcher::{
    apply_patch_sets, decode_str, encode_document, DiffEngine, NullReporter, PatchMeta,
    PatchRecord, PatchSet,
};
use std::fs;

/// Original bytes plus a modified copy that is the same length or longer.
fn original_and_modified() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (
        prop::collection::vec(any::<u8>(), 0..1500),
        prop::collection::vec(any::<u8>(), 0..200),
        prop::collection::vec((any::<Index>(), any::<u8>()), 0..40),
    )
        .prop_map(|(original, extra, edits)| {
            let mut modified = original.clone();
            modified.extend(extra);
            if !modified.is_empty() {
                for (index, byte) in edits {
                    let i = index.index(modified.len());
                    modified[i] = byte;
                }
            }
            (original, modified)
        })
}

fn record_strategy() -> impl Strategy<Value = PatchRecord> {
    (0u64..u64::MAX / 2, prop::collection::vec(any::<u8>(), 1..24))
        .prop_map(|(offset, payload)| PatchRecord::new(offset, payload).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn diff_then_apply_reproduces_modified(
        (original, modified) in original_and_modified(),
        block_size in 1usize..96,
    ) {
        let records = DiffEngine::with_block_size(block_size)
            .diff_bytes(&original, &modified)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let original_path = dir.path().join("orig.bin");
        let patched_path = dir.path().join("patched.bin");
        fs::write(&original_path, &original).unwrap();

        let set = PatchSet::new(PatchMeta::new("diff", "prop", "test", "generated"), records)
            .unwrap();
        apply_patch_sets(&original_path, &patched_path, &[&set], &NullReporter).unwrap();

        prop_assert_eq!(fs::read(&patched_path).unwrap(), modified);
    }

    #[test]
    fn diff_runs_are_maximal(
        (original, modified) in original_and_modified(),
        block_size in 1usize..96,
    ) {
        let records = DiffEngine::with_block_size(block_size)
            .diff_bytes(&original, &modified)
            .unwrap();

        // At least one unchanged byte between consecutive runs.
        for pair in records.windows(2) {
            prop_assert!(pair[0].end() < pair[1].offset());
        }

        let mut changed = vec![false; modified.len()];
        for record in &records {
            for (i, &byte) in record.payload().iter().enumerate() {
                let at = record.offset() as usize + i;
                prop_assert_eq!(byte, modified[at]);
                prop_assert_ne!(original.get(at), Some(&byte));
                changed[at] = true;
            }
        }
        for (at, was_changed) in changed.iter().enumerate() {
            if !was_changed {
                prop_assert_eq!(original.get(at), Some(&modified[at]));
            }
        }
    }

    #[test]
    fn block_size_does_not_change_result(
        (original, modified) in original_and_modified(),
        block_size in 1usize..96,
    ) {
        let reference = DiffEngine::new().diff_bytes(&original, &modified).unwrap();
        let other = DiffEngine::with_block_size(block_size)
            .diff_bytes(&original, &modified)
            .unwrap();
        prop_assert_eq!(reference, other);
    }

    #[test]
    fn encode_then_decode_preserves_records(
        records in prop::collection::vec(record_strategy(), 0..12),
        name in "[A-Za-z0-9 ]{0,16}",
        description in "[ -~]{0,40}",
    ) {
        let meta = PatchMeta::new(format!("Patch {name}"), "prop", "group-a", description.trim());
        let text = encode_document(&meta, &records).unwrap();
        let sets = decode_str(&text).unwrap();

        prop_assert_eq!(sets.len(), 1);
        prop_assert_eq!(sets[0].records(), records.as_slice());
        prop_assert_eq!(sets[0].meta(), &meta);
    }
}
