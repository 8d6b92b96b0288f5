//! Extracting rosters from many image files at once.
//!
//! [`extract_sheets`] returns a stream of futures, one per input file. Resolve
//! it with [`futures::StreamExt::buffered`] to run several extractions at
//! once while still receiving outcomes in submission order.
//!
//! A sheet that can't be read or analyzed produces a failed [`SheetOutcome`]
//! instead of an error, so one bad photo doesn't throw away the whole batch.

use std::sync::Mutex;

use futures::{FutureExt as _, StreamExt as _, stream};
use schemars::JsonSchema;

use crate::{
    async_utils::{BoxedFuture, BoxedStream},
    data_url::data_url,
    error::AnalysisError,
    extraction::ExtractionService,
    prelude::*,
    roster::Roster,
    ui::Ui,
};

/// Output status of a sheet.
#[derive(Clone, Copy, Debug, JsonSchema, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SheetStatus {
    // We have a roster for this sheet.
    Ok,

    // The sheet could not be analyzed.
    Failed,
}

/// The result of analyzing one sheet.
#[derive(Clone, Debug, Serialize)]
pub struct SheetOutcome {
    /// Position of this sheet in the input.
    pub index: usize,

    /// The input path.
    pub path: PathBuf,

    /// Did this sheet work?
    pub status: SheetStatus,

    /// Any errors that occurred during processing.
    pub errors: Vec<String>,

    /// The extracted roster, if any.
    #[serde(skip)]
    pub roster: Option<Arc<Roster>>,
}

/// Analyze a list of image files.
pub fn extract_sheets(
    service: Arc<ExtractionService>,
    paths: Vec<PathBuf>,
) -> BoxedStream<BoxedFuture<SheetOutcome>> {
    stream::iter(paths.into_iter().enumerate())
        .map(move |(index, path)| {
            let service = service.clone();
            async move { extract_sheet(&service, index, path).await }.boxed()
        })
        .boxed()
}

/// Analyze a single image file, recording any failure in the outcome.
#[instrument(level = "debug", skip_all, fields(index = index, path = %path.display()))]
pub async fn extract_sheet(
    service: &ExtractionService,
    index: usize,
    path: PathBuf,
) -> SheetOutcome {
    match extract_sheet_inner(service, &path).await {
        Ok(roster) => SheetOutcome {
            index,
            path,
            status: SheetStatus::Ok,
            errors: vec![],
            roster: Some(roster),
        },
        Err(err) => {
            warn!("Could not analyze {}: {:#}", path.display(), err);
            SheetOutcome {
                index,
                path,
                status: SheetStatus::Failed,
                errors: vec![format!("{:?}", err)],
                roster: None,
            }
        }
    }
}

/// Perform actual work for `extract_sheet`.
async fn extract_sheet_inner(
    service: &ExtractionService,
    path: &Path,
) -> Result<Arc<Roster>> {
    let payload = read_image_payload(path).await?;
    let roster = service
        .extract(&payload)
        .await
        .with_context(|| format!("failed to analyze {:?}", path))?;
    Ok(roster)
}

/// Read an image file as a `data:` URL.
pub async fn read_image_payload(path: &Path) -> Result<String> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {:?}", path))?;
    let mime_type = image_mime_type(path, &data).ok_or_else(|| {
        AnalysisError::InvalidPayload(format!("{:?} is not an image file", path))
    })?;
    Ok(data_url(&mime_type, &data))
}

/// Work out an image's MIME type, preferring its content over its name.
fn image_mime_type(path: &Path, data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    let sniffed = infer::get(data).map(|kind| kind.mime_type().to_owned());
    let guessed = || mime_guess::from_path(path).first().map(|m| m.to_string());
    sniffed
        .or_else(guessed)
        .filter(|mime_type| mime_type.starts_with("image/"))
}

/// Counters for a batch of sheets.
#[derive(Clone, Debug, Default)]
pub struct SheetCounters {
    /// How many sheets did we process?
    pub total_count: usize,

    /// How many sheets failed?
    pub failure_count: usize,

    /// How many students did the successful sheets contain?
    pub student_count: usize,
}

impl SheetCounters {
    /// Wrap a stream of outcomes with counters.
    pub fn wrap_stream(
        stream: BoxedStream<SheetOutcome>,
    ) -> (BoxedStream<SheetOutcome>, Arc<Mutex<SheetCounters>>) {
        let counters = Arc::new(Mutex::new(Self::default()));
        let counters_clone = counters.clone();
        let stream = stream
            .map(move |outcome| {
                counters_clone.update(&outcome);
                outcome
            })
            .boxed();
        (stream, counters)
    }
}

/// Methods on `Mutex<SheetCounters>`, which is the type we share.
pub trait SheetCounterExt {
    /// Update counters for a sheet.
    fn update(&self, outcome: &SheetOutcome);

    /// Display counter values to the user.
    fn finish(&self, ui: &Ui);
}

impl SheetCounterExt for Mutex<SheetCounters> {
    fn update(&self, outcome: &SheetOutcome) {
        // Hold a sync lock, but just for an instant to update counters.
        let mut counters = self.lock().expect("lock poisoned");
        counters.total_count += 1;
        match &outcome.roster {
            Some(roster) => counters.student_count += roster.students().len(),
            None => counters.failure_count += 1,
        }
    }

    fn finish(&self, ui: &Ui) {
        let counters = self.lock().expect("lock poisoned").to_owned();
        ui.display_message(
            "📋",
            &format!(
                "{} students found on {} sheets",
                counters.student_count,
                counters.total_count - counters.failure_count,
            ),
        );
        if counters.failure_count > 0 {
            ui.display_message(
                "❌",
                &format!("{} sheets could not be analyzed", counters.failure_count),
            );
        }
    }
}
