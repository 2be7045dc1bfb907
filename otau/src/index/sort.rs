//! Ordering and duplicate marking of index entries.

use tracing::debug;

use super::descriptor::ImageDescriptor;

/// Sort index entries and mark entries that share an identifying triple.
///
/// Entries are ordered by manufacturer code, image type and file version,
/// with the model id as tie breaker. Every member of a group of two or more
/// entries with the same triple gets `duplicate = true`. Nothing is removed
/// and an existing duplicate flag is never cleared.
pub fn sort_descriptors(mut descriptors: Vec<ImageDescriptor>) -> Vec<ImageDescriptor> {
    descriptors.sort_by(|a, b| {
        a.identity()
            .cmp(&b.identity())
            .then_with(|| a.model_id.cmp(&b.model_id))
    });

    let mut groups = 0;
    for group in descriptors.chunk_by_mut(|a, b| a.identity() == b.identity()) {
        if group.len() < 2 {
            continue;
        }
        groups += 1;
        debug!(
            identity = %group[0].identity(),
            entries = group.len(),
            "Index entries share identifying fields"
        );
        for descriptor in group.iter_mut() {
            descriptor.duplicate = true;
        }
    }

    debug!(
        entries = descriptors.len(),
        duplicate_groups = groups,
        "Sorted index entries"
    );
    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{image_filename, ModelId};

    fn entry(m: u16, t: u16, v: u32, model: &str) -> ImageDescriptor {
        ImageDescriptor::new(m, t, v, format!("https://example.com/{}", model)).with_model_id(model)
    }

    #[test]
    fn test_marks_duplicate_pair() {
        let sorted = sort_descriptors(vec![
            entry(1, 1, 2, "modelC"),
            entry(1, 1, 1, "modelB"),
            entry(1, 1, 1, "modelA"),
        ]);

        let flags: Vec<bool> = sorted.iter().map(|d| d.duplicate).collect();
        assert_eq!(flags, vec![true, true, false]);

        let names: Vec<String> = sorted.iter().map(image_filename).collect();
        assert_eq!(
            names,
            vec![
                "0001-0001-00000001-modelA.zigbee",
                "0001-0001-00000001-modelB.zigbee",
                "0001-0001-00000002.zigbee",
            ]
        );
    }

    #[test]
    fn test_marks_whole_group_of_three() {
        let sorted = sort_descriptors(vec![
            entry(5, 1, 1, "c"),
            entry(5, 1, 1, "a"),
            entry(4, 9, 9, "z"),
            entry(5, 1, 1, "b"),
        ]);

        assert!(!sorted[0].duplicate);
        assert!(sorted[1..].iter().all(|d| d.duplicate));
        let models: Vec<Option<ModelId>> = sorted.iter().map(|d| d.model_id.clone()).collect();
        assert_eq!(
            models,
            vec![
                Some(ModelId::from("z")),
                Some(ModelId::from("a")),
                Some(ModelId::from("b")),
                Some(ModelId::from("c")),
            ]
        );
    }

    #[test]
    fn test_numeric_sort_order() {
        let sorted = sort_descriptors(vec![
            entry(0x117C, 0x2101, 10, "x"),
            entry(0x100B, 0x0116, 300, "x"),
            entry(0x117C, 0x0001, 2, "x"),
            entry(0x117C, 0x2101, 9, "x"),
        ]);

        let keys: Vec<(u16, u16, u32)> = sorted
            .iter()
            .map(|d| (d.manufacturer_code, d.image_type, d.file_version))
            .collect();
        assert_eq!(
            keys,
            vec![
                (0x100B, 0x0116, 300),
                (0x117C, 0x0001, 2),
                (0x117C, 0x2101, 9),
                (0x117C, 0x2101, 10),
            ]
        );
        assert!(sorted.iter().all(|d| !d.duplicate));
    }

    #[test]
    fn test_existing_flag_is_kept() {
        let mut flagged = entry(1, 1, 1, "a");
        flagged.duplicate = true;

        let sorted = sort_descriptors(vec![flagged, entry(2, 2, 2, "b")]);
        assert!(sorted[0].duplicate);
        assert!(!sorted[1].duplicate);
    }

    #[test]
    fn test_empty_index() {
        assert!(sort_descriptors(Vec::new()).is_empty());
    }
}
