use debrid_dash::models::{FileInfo, ItemStatus, MediaType, ProcessingItem};

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A mid-download item with no milestones reached.
pub fn downloading_item(id: &str, progress: u8) -> ProcessingItem {
    ProcessingItem {
        id: id.into(),
        title: format!("Release.{}.2160p", id),
        media_type: MediaType::Movie,
        status: ItemStatus {
            cached: false,
            added: false,
            mounted: false,
            symlinked: false,
            imported: false,
            status: "Downloading".into(),
            error: false,
            error_time: None,
            error_message: None,
            progress,
            parsed_info: None,
        },
        progress,
        debrid_provider: Some("RealDebrid".into()),
        file_info: FileInfo::default(),
    }
}
