//! `inspect` and `json` commands

use anyhow::{Context, Result};
use ctrinspect_lib::{render_details, ContainerInspector};
use std::io::Write;

/// Print the labelled detail view of a container
pub async fn show_details<W: Write>(
    inspector: &mut dyn ContainerInspector,
    id: &str,
    full: bool,
    out: &mut W,
) -> Result<()> {
    // Sizes only with --full
    let inspection = inspector
        .inspect(id, full)
        .await
        .with_context(|| format!("Failed to inspect container '{}'", id))?;
    out.write_all(render_details(&inspection.record, full).as_bytes())?;
    Ok(())
}

/// Print the engine's response body exactly as received
pub async fn show_raw<W: Write>(
    inspector: &mut dyn ContainerInspector,
    id: &str,
    out: &mut W,
) -> Result<()> {
    let inspection = inspector
        .inspect(id, false)
        .await
        .with_context(|| format!("Failed to get raw inspect response for '{}'", id))?;
    out.write_all(&inspection.raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fakes::FakeInspector;
    use ctrinspect_lib::ContainerRecord;

    const RAW: &[u8] = b"{ \"Name\":\"/web\" ,\"Id\" : \"abc\",\n\t\"SizeRw\":null }";

    fn decoded() -> ContainerRecord {
        serde_json::from_slice(RAW).unwrap()
    }

    #[tokio::test]
    async fn test_json_output_is_byte_identical() {
        let mut inspector = FakeInspector::returning(decoded(), RAW);
        let mut out = Vec::new();

        show_raw(&mut inspector, "abc", &mut out).await.unwrap();

        assert_eq!(out, RAW);
        assert_eq!(inspector.calls, vec![("abc".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_details_without_full_skips_sizes() {
        let mut record = decoded();
        record.size_rw = Some(100);
        let mut inspector = FakeInspector::returning(record, RAW);
        let mut out = Vec::new();

        show_details(&mut inspector, "abc", false, &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Name: /web\n"));
        assert!(!text.contains("SizeRw"));
        assert_eq!(inspector.calls, vec![("abc".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_details_with_full_requests_sizes() {
        let mut record = decoded();
        record.size_rw = Some(100);
        let mut inspector = FakeInspector::returning(record, RAW);
        let mut out = Vec::new();

        show_details(&mut inspector, "abc", true, &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("SizeRw: 100\n"));
        assert_eq!(inspector.calls, vec![("abc".to_string(), true)]);
    }

    #[tokio::test]
    async fn test_inspection_failure_writes_nothing() {
        let mut inspector = FakeInspector::missing();
        let mut out = Vec::new();

        let err = show_details(&mut inspector, "ghost", false, &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to inspect container 'ghost'");
        assert!(format!("{:#}", err).contains(": inspect for 'ghost' failed: "));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_raw_failure_names_operation() {
        let mut inspector = FakeInspector::missing();
        let mut out = Vec::new();

        let err = show_raw(&mut inspector, "ghost", &mut out).await.unwrap_err();

        assert!(format!("{:#}", err)
            .starts_with("Failed to get raw inspect response for 'ghost': inspect for 'ghost'"));
        assert!(out.is_empty());
    }
}
