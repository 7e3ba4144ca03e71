use profilog::lookup::{PostOffice, build_pincode_options};

fn office(name: &str, block: &str, district: &str, pincode: &str) -> PostOffice {
    PostOffice {
        name: name.to_string(),
        block: block.to_string(),
        district: district.to_string(),
        pincode: pincode.to_string(),
    }
}

#[test]
fn duplicate_labels_collapse_and_labels_sort_ascending() {
    let raw = vec![
        office("A", "X", "D", "1"),
        office("A", "X", "D", "1"),
        office("B", "Y", "D", "2"),
    ];
    let options = build_pincode_options(&raw);

    assert_eq!(options.len(), 2);
    assert_eq!(options[0].label, "A • X — 1");
    assert_eq!(options[0].value, "1");
    assert_eq!(options[1].label, "B • Y — 2");
    assert_eq!(options[1].value, "2");
}

#[test]
fn na_block_falls_back_to_the_district() {
    let raw = vec![office("Agara", "NA", "Bengaluru", "560034")];
    let options = build_pincode_options(&raw);
    assert_eq!(options[0].label, "Agara • Bengaluru — 560034");
}

#[test]
fn empty_block_also_falls_back_to_the_district() {
    let raw = vec![office("Agara", "", "Bengaluru", "560034")];
    let options = build_pincode_options(&raw);
    assert_eq!(options[0].label, "Agara • Bengaluru — 560034");
}

#[test]
fn label_degrades_to_the_bare_pincode_without_place_parts() {
    let raw = vec![office("", "NA", "", "560001"), office("  ", "", "  ", "560002")];
    let options = build_pincode_options(&raw);
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].label, "560001");
    assert_eq!(options[1].label, "560002");
}

#[test]
fn first_occurrence_wins_on_label_collision() {
    let raw = vec![office("A", "X", "first", "1"), office("A", "X", "second", "1")];
    let options = build_pincode_options(&raw);
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].value, "1");
}

#[test]
fn output_is_sorted_regardless_of_input_order() {
    let raw = vec![
        office("Zulu", "Z", "D", "3"),
        office("Alpha", "A", "D", "1"),
        office("Mike", "M", "D", "2"),
    ];
    let labels: Vec<_> = build_pincode_options(&raw)
        .into_iter()
        .map(|o| o.label)
        .collect();
    assert_eq!(
        labels,
        vec!["Alpha • A — 1", "Mike • M — 2", "Zulu • Z — 3"]
    );
}

#[test]
fn name_and_block_are_trimmed_before_joining() {
    let raw = vec![office(" Agara ", " Sarjapura ", "Bengaluru", "560034")];
    let options = build_pincode_options(&raw);
    assert_eq!(options[0].label, "Agara • Sarjapura — 560034");
}
