use jtrig_core::BinningDescriptor;

fn descriptor() -> BinningDescriptor {
    let mut descriptor = BinningDescriptor::new();
    descriptor
        .set_configured("CentralityBinEdges", &[0.0, 10.0, 30.0, 50.0, 90.0])
        .expect("centrality");
    descriptor
}

#[test]
fn configured_entries_are_write_once() {
    let mut descriptor = descriptor();
    let err = descriptor
        .set_configured("CentralityBinEdges", &[0.0, 100.0])
        .unwrap_err();
    assert_eq!(err.info().code, "descriptor_write_once");
    assert!(descriptor
        .set_derived("CentralityBinEdges", &[0.0, 100.0])
        .is_err());
}

#[test]
fn derived_entries_can_be_replaced() {
    let mut descriptor = descriptor();
    descriptor.set_derived("JetPtRebin", &[0.0, 100.0]).expect("first");
    descriptor
        .set_derived("JetPtRebin", &[0.0, 50.0, 100.0])
        .expect("second");
    assert!(descriptor.is_derived("JetPtRebin"));
    assert_eq!(descriptor.n_bins("JetPtRebin"), 2);
}

#[test]
fn bin_lookup_uses_sentinel_outside_range() {
    let descriptor = descriptor();
    assert_eq!(descriptor.n_bins("CentralityBinEdges"), 4);
    assert_eq!(descriptor.bin_index("CentralityBinEdges", -0.1), None);
    assert_eq!(descriptor.bin_index("CentralityBinEdges", 0.0), Some(0));
    assert_eq!(descriptor.bin_index("CentralityBinEdges", 29.9), Some(1));
    assert_eq!(descriptor.bin_index("CentralityBinEdges", 90.0), None);
    assert_eq!(descriptor.bin_index("Missing", 1.0), None);
}

#[test]
fn border_getters_follow_bin_counts() {
    let descriptor = descriptor();
    assert_eq!(descriptor.low_edge("CentralityBinEdges", 1), Some(10.0));
    assert_eq!(descriptor.low_edge("CentralityBinEdges", 4), Some(90.0));
    assert_eq!(descriptor.low_edge("CentralityBinEdges", 5), None);
    assert_eq!(descriptor.high_edge("CentralityBinEdges", 3), Some(90.0));
    assert_eq!(descriptor.high_edge("CentralityBinEdges", 4), None);
}

#[test]
fn projection_hash_is_recorded_post_hoc() {
    let mut descriptor = descriptor();
    assert!(descriptor.projection_hash().is_none());
    descriptor.set_projection_hash("abc123");
    assert_eq!(descriptor.projection_hash(), Some("abc123"));
}
