#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use yolococo::coco::{Annotation, Category, CategoryId, CocoDocument, Image, ImageId};

/// Category names shared by generated documents. With [`IdScheme::Shared`]
/// name `VOCAB[i]` always has id `i + 1`.
pub const VOCAB: [&str; 6] = ["car", "bus", "person", "bike", "truck", "dog"];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// How generated documents number their categories.
#[derive(Clone, Copy, Debug)]
pub enum IdScheme {
    /// Same name, same id across every document.
    Shared,
    /// Each document numbers its categories independently.
    Independent,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnnSem {
    pub image_file: String,
    pub category: String,
    pub bbox: [f64; 4],
}

pub fn ann_semantics(doc: &CocoDocument) -> Result<Vec<AnnSem>, String> {
    let image_by_id: BTreeMap<ImageId, &str> = doc
        .images
        .iter()
        .map(|img| (img.id, img.file_name.as_str()))
        .collect();
    let category_by_id: BTreeMap<CategoryId, &str> = doc
        .categories
        .iter()
        .map(|cat| (cat.id, cat.name.as_str()))
        .collect();

    let mut out = Vec::with_capacity(doc.annotations.len());
    for ann in &doc.annotations {
        let image_file = image_by_id.get(&ann.image_id).ok_or_else(|| {
            format!(
                "annotation {} references missing image_id {}",
                ann.id, ann.image_id
            )
        })?;
        let category = category_by_id.get(&ann.category_id).ok_or_else(|| {
            format!(
                "annotation {} references missing category_id {}",
                ann.id, ann.category_id
            )
        })?;
        out.push(AnnSem {
            image_file: image_file.to_string(),
            category: category.to_string(),
            bbox: ann.bbox,
        });
    }

    sort_semantics(&mut out);
    Ok(out)
}

pub fn sort_semantics(anns: &mut [AnnSem]) {
    anns.sort_by(|a, b| {
        a.image_file
            .cmp(&b.image_file)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.bbox.partial_cmp(&b.bbox).unwrap_or(std::cmp::Ordering::Equal))
    });
}

pub fn assert_valid_references(doc: &CocoDocument) -> Result<(), String> {
    let image_ids: BTreeSet<ImageId> = doc.images.iter().map(|img| img.id).collect();
    let category_ids: BTreeSet<CategoryId> = doc.categories.iter().map(|cat| cat.id).collect();

    if image_ids.len() != doc.images.len() {
        return Err("duplicate image ids".to_string());
    }
    for ann in &doc.annotations {
        if !image_ids.contains(&ann.image_id) {
            return Err(format!(
                "annotation {} references missing image_id {}",
                ann.id, ann.image_id
            ));
        }
        if !category_ids.contains(&ann.category_id) {
            return Err(format!(
                "annotation {} references missing category_id {}",
                ann.id, ann.category_id
            ));
        }
    }
    Ok(())
}

/// A structurally valid document. File names come from a small pool so that
/// separately generated documents often share some.
pub fn arb_document(max_images: usize, max_anns: usize, ids: IdScheme) -> BoxedStrategy<CocoDocument> {
    assert!(max_images > 0, "max_images must be > 0");

    (
        proptest::collection::hash_map(
            image_file_name_strategy(),
            (2u32..=2048, 2u32..=2048),
            1..=max_images,
        ),
        proptest::sample::subsequence(VOCAB.to_vec(), 1..=VOCAB.len()),
        proptest::collection::vec(1u64..=50, VOCAB.len()),
        proptest::collection::vec(ann_seed_strategy(), 0..=max_anns),
    )
        .prop_map(move |(images, names, id_seeds, ann_seeds)| {
            build_document(images, names, &id_seeds, ann_seeds, ids)
        })
        .boxed()
}

type AnnSeed = (u16, u16, u32, u32, u32, u32);

fn ann_seed_strategy() -> impl Strategy<Value = AnnSeed> {
    (
        any::<u16>(),
        any::<u16>(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
    )
}

fn image_file_name_strategy() -> BoxedStrategy<String> {
    proptest::string::string_regex("[a-e]{1,2}\\.jpg")
        .expect("valid filename regex")
        .boxed()
}

fn build_document(
    image_data: HashMap<String, (u32, u32)>,
    names: Vec<&str>,
    id_seeds: &[u64],
    ann_seeds: Vec<AnnSeed>,
    ids: IdScheme,
) -> CocoDocument {
    let mut image_rows: Vec<(String, (u32, u32))> = image_data.into_iter().collect();
    image_rows.sort_by(|a, b| a.0.cmp(&b.0));

    // Independent ids: a seeded offset walk keeps them unique within the document.
    let mut next_free = 0u64;
    let categories: Vec<Category> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let id = match ids {
                IdScheme::Shared => VOCAB.iter().position(|v| v == name).unwrap_or(idx) as u64 + 1,
                IdScheme::Independent => {
                    next_free += id_seeds[idx % id_seeds.len()];
                    next_free
                }
            };
            Category::new(id, *name)
        })
        .collect();

    let images: Vec<Image> = image_rows
        .iter()
        .enumerate()
        .map(|(idx, (file_name, (width, height)))| {
            Image::new((idx as u64 + 1) * 10, file_name.clone(), *width, *height)
        })
        .collect();

    let annotations: Vec<Annotation> = ann_seeds
        .into_iter()
        .enumerate()
        .map(|(idx, (image_seed, category_seed, sx, sy, sw, sh))| {
            let image = &images[image_seed as usize % images.len()];
            let category = &categories[category_seed as usize % categories.len()];
            let bbox = bbox_from_seed(image.width, image.height, sx, sy, sw, sh);
            Annotation::new(idx as u64 + 100, image.id, category.id, bbox)
        })
        .collect();

    CocoDocument {
        info: None,
        licenses: vec![],
        images,
        annotations,
        categories,
    }
}

/// COCO `[x, y, w, h]` inside a `width x height` image, integer-valued.
pub fn bbox_from_seed(width: u32, height: u32, sx: u32, sy: u32, sw: u32, sh: u32) -> [f64; 4] {
    let x = sx % (width - 1);
    let y = sy % (height - 1);
    let w = 1 + (sw % (width - x));
    let h = 1 + (sh % (height - y));
    [x as f64, y as f64, w.min(width - x) as f64, h.min(height - y) as f64]
}
