// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Processing engine — validated configuration plus the prebuilt filters every
// scan needs, loaded once and shared.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use flatscan_core::ScanConfig;
use flatscan_core::error::{FlatscanError, Result};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use image::{DynamicImage, RgbImage};
use tracing::{info, instrument, warn};

use super::detect::DocumentDetector;
use super::enhance::ScanEnhancer;
use super::filter::GaussianKernel;
use crate::image::processor::ImageProcessor;

/// Everything a scan needs that does not depend on the input image.
#[derive(Debug)]
pub struct ScanEngine {
    config: ScanConfig,
    detector: DocumentDetector,
    threshold_kernel: GaussianKernel,
}

impl ScanEngine {
    /// Validate `config` and build the filters it describes.
    ///
    /// # Errors
    ///
    /// `PipelineUnavailable` if the configuration is unusable.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            detector: DocumentDetector::from_config(&config),
            threshold_kernel: GaussianKernel::new(config.threshold_block_size),
            config,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn detector(&self) -> &DocumentDetector {
        &self.detector
    }

    /// Binarize a rectified raster and encode it as JPEG.
    pub fn enhance_and_encode(&self, rectified: RgbImage) -> Result<Vec<u8>> {
        let enhanced = ScanEnhancer::from_dynamic(DynamicImage::ImageRgb8(rectified))
            .enhance_scan(&self.threshold_kernel, self.config.threshold_offset)
            .into_dynamic();
        ImageProcessor::from_dynamic(enhanced).to_jpeg_bytes(self.config.jpeg_quality)
    }
}

type EngineLoad = Shared<BoxFuture<'static, std::result::Result<Arc<ScanEngine>, Arc<FlatscanError>>>>;

/// Lazily initialised, process-wide handle to a [`ScanEngine`].
///
/// The first caller starts the load; everyone arriving while it runs awaits
/// that same attempt and sees its outcome. A failed attempt is dropped once
/// it settles, so the next call starts a fresh one.
pub struct EngineCell {
    config: ScanConfig,
    slot: Mutex<Option<EngineLoad>>,
    loads: AtomicUsize,
}

impl EngineCell {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            slot: Mutex::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    /// The shared engine, initialising it on first use.
    ///
    /// # Errors
    ///
    /// `PipelineUnavailable` if the engine cannot be built.
    pub async fn get(&self) -> Result<Arc<ScanEngine>> {
        let attempt = {
            let mut slot = self.lock_slot()?;
            slot.get_or_insert_with(|| self.start_load()).clone()
        };

        match attempt.clone().await {
            Ok(engine) => Ok(engine),
            Err(err) => {
                let mut slot = self.lock_slot()?;
                if slot.as_ref().is_some_and(|current| current.ptr_eq(&attempt)) {
                    *slot = None;
                }
                Err(match &*err {
                    FlatscanError::PipelineUnavailable(msg) => {
                        FlatscanError::PipelineUnavailable(msg.clone())
                    }
                    other => FlatscanError::PipelineUnavailable(other.to_string()),
                })
            }
        }
    }

    fn start_load(&self) -> EngineLoad {
        let attempt = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        load_engine(self.config.clone(), attempt)
            .map(|loaded| loaded.map_err(Arc::new))
            .boxed()
            .shared()
    }

    fn lock_slot(&self) -> Result<MutexGuard<'_, Option<EngineLoad>>> {
        self.slot
            .lock()
            .map_err(|_| FlatscanError::PipelineUnavailable("engine state lock poisoned".into()))
    }

    /// Number of initialisation attempts made so far.
    pub fn load_attempts(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| slot.as_ref().and_then(|load| load.peek()).is_some_and(|r| r.is_ok()))
            .unwrap_or(false)
    }
}

#[instrument(skip(config))]
async fn load_engine(config: ScanConfig, attempt: usize) -> Result<Arc<ScanEngine>> {
    info!("Loading scan engine");
    let engine = tokio::task::spawn_blocking(move || ScanEngine::new(config))
        .await
        .map_err(|err| {
            FlatscanError::PipelineUnavailable(format!("engine loader did not finish: {}", err))
        })?
        .inspect_err(|err| warn!(error = %err, "Scan engine failed to load"))?;
    Ok(Arc::new(engine))
}

static SHARED: OnceLock<EngineCell> = OnceLock::new();

/// The process-wide engine built from the default configuration.
pub async fn shared_engine() -> Result<Arc<ScanEngine>> {
    SHARED
        .get_or_init(|| EngineCell::new(ScanConfig::default()))
        .get()
        .await
}
