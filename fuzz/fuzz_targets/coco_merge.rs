//! Fuzz target for merging: any parsable document merged with itself, in
//! both category modes, must either fail validation or yield a document
//! that passes it.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolococo::coco::{check_integrity, from_coco_slice};
use yolococo::merge::{merge, MergeInput, MergeOptions};

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(doc) = from_coco_slice(data) else {
        return;
    };
    let inputs = [
        MergeInput::new("left", doc.clone()),
        MergeInput::new("right", doc),
    ];

    for align_by_name in [false, true] {
        let opts = MergeOptions {
            align_by_name,
            drop_duplicate_filenames: true,
            ..Default::default()
        };
        if let Ok(merged) = merge(&inputs, &opts) {
            assert!(check_integrity(&merged, "merged").is_ok());
        }
    }
});
