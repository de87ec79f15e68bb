#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use hoist_docker::ImageRef;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    name: String,
    tag: Option<String>,
}

fuzz_target!(|input: FuzzInput| {
    let image = ImageRef::parse(&input.name, input.tag.as_deref());
    let shown = image.to_string();

    assert!(!image.tag.is_empty(), "tag always falls back to a default");
    match &image.digest {
        Some(digest) => {
            assert!(!digest.is_empty());
            assert_eq!(shown, format!("{}@{}", image.name, digest));
            assert_eq!(image.pull_tag(), digest);
            assert!(input.name.ends_with(&format!("@{digest}")));
        }
        None => {
            assert_eq!(shown, format!("{}:{}", image.name, image.tag));
            assert_eq!(image.pull_tag(), image.tag);
        }
    }
});
