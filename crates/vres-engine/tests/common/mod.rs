//! Scripted in-memory platform for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use vres_engine::{Coordinator, EngineConfig};
use vres_models::{
    ChannelId, JobId, MessageId, Owner, ParkedHandle, Submission, UserId, Variant, VariantSet,
};
use vres_platform::{
    DeliveryError, PlatformError, ProbeError, ProcessingPlatform, RelocateError, ScheduleError,
    Staged, StaticLimits,
};

#[derive(Default)]
struct FakeState {
    next_job_id: i64,
    next_parked: i64,
    fail_relocate: bool,
    fail_park: bool,
    fail_delivery: bool,
    fail_probe: bool,
    instant_ready: Option<VariantSet>,
    ready: HashMap<ParkedHandle, VariantSet>,
    relocated: Vec<String>,
    delivered: Vec<(UserId, usize)>,
    replaced: Vec<(ChannelId, MessageId)>,
    cancelled: Vec<ParkedHandle>,
    notices: Vec<(UserId, String)>,
    reports: Vec<String>,
}

/// Platform double whose behavior is scripted per test.
///
/// Relocation attempts, deliveries, cancellations and notices are recorded
/// in call order for assertions.
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                next_job_id: 1,
                next_parked: 100,
                ..Default::default()
            }),
        })
    }

    pub fn set_fail_relocate(&self, fail: bool) {
        self.state.lock().unwrap().fail_relocate = fail;
    }

    pub fn set_fail_park(&self, fail: bool) {
        self.state.lock().unwrap().fail_park = fail;
    }

    pub fn set_fail_delivery(&self, fail: bool) {
        self.state.lock().unwrap().fail_delivery = fail;
    }

    pub fn set_fail_probe(&self, fail: bool) {
        self.state.lock().unwrap().fail_probe = fail;
    }

    /// Have the next relocation report variants already present.
    pub fn set_instant_ready(&self, variants: VariantSet) {
        self.state.lock().unwrap().instant_ready = Some(variants);
    }

    /// Have probes for this parked handle report the given variants.
    pub fn make_ready(&self, parked: ParkedHandle, variants: VariantSet) {
        self.state.lock().unwrap().ready.insert(parked, variants);
    }

    /// Relocation attempts (successful or not), in call order.
    pub fn relocations(&self) -> Vec<String> {
        self.state.lock().unwrap().relocated.clone()
    }

    pub fn delivered(&self) -> Vec<(UserId, usize)> {
        self.state.lock().unwrap().delivered.clone()
    }

    pub fn replaced(&self) -> Vec<(ChannelId, MessageId)> {
        self.state.lock().unwrap().replaced.clone()
    }

    pub fn cancelled(&self) -> Vec<ParkedHandle> {
        self.state.lock().unwrap().cancelled.clone()
    }

    pub fn notices(&self) -> Vec<(UserId, String)> {
        self.state.lock().unwrap().notices.clone()
    }

    pub fn reports(&self) -> Vec<String> {
        self.state.lock().unwrap().reports.clone()
    }
}

#[async_trait]
impl ProcessingPlatform for FakePlatform {
    async fn relocate(&self, submission: &Submission) -> Result<Staged, RelocateError> {
        let mut state = self.state.lock().unwrap();
        state.relocated.push(submission.asset.as_str().to_string());
        if state.fail_relocate {
            return Err(RelocateError::staging_failed("scripted relocation failure"));
        }
        let job_id = JobId(state.next_job_id);
        state.next_job_id += 1;
        let ready = state.instant_ready.take();
        Ok(Staged { job_id, ready })
    }

    async fn park_for_processing(&self, _job_id: JobId) -> Result<ParkedHandle, ScheduleError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_park {
            return Err(ScheduleError::park_failed("scripted park failure"));
        }
        let parked = ParkedHandle(state.next_parked);
        state.next_parked += 1;
        Ok(parked)
    }

    async fn probe_completion(
        &self,
        parked: ParkedHandle,
    ) -> Result<Option<VariantSet>, ProbeError> {
        let state = self.state.lock().unwrap();
        if state.fail_probe {
            return Err(ProbeError::transient("scripted probe failure"));
        }
        Ok(state.ready.get(&parked).cloned())
    }

    async fn cancel_parked(&self, parked: ParkedHandle) -> Result<(), PlatformError> {
        self.state.lock().unwrap().cancelled.push(parked);
        Ok(())
    }

    async fn deliver_result(
        &self,
        user: UserId,
        variants: &VariantSet,
    ) -> Result<(), DeliveryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_delivery {
            return Err(DeliveryError::send_failed("scripted delivery failure"));
        }
        state.delivered.push((user, variants.len()));
        Ok(())
    }

    async fn replace_in_place(
        &self,
        channel: ChannelId,
        message: MessageId,
        variants: &VariantSet,
    ) -> Result<(), DeliveryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_delivery {
            return Err(DeliveryError::edit_failed("scripted edit failure"));
        }
        let _ = variants;
        state.replaced.push((channel, message));
        Ok(())
    }

    async fn notify(&self, user: UserId, text: &str) {
        self.state.lock().unwrap().notices.push((user, text.to_string()));
    }

    async fn report_operator(&self, text: &str) {
        self.state.lock().unwrap().reports.push(text.to_string());
    }
}

pub fn variants(n: usize) -> VariantSet {
    VariantSet::new(
        (0..n)
            .map(|i| Variant {
                file_id: format!("variant-{}", i),
                width: 1280,
                height: 720,
                file_size: 1024 * (i as u64 + 1),
            })
            .collect(),
    )
}

pub fn submission(owner: Owner, tag: &str) -> Submission {
    Submission::new(owner, vres_models::AssetRef::new(tag), 4 * 1024 * 1024, 120, 720)
}

/// Route engine logs to the test writer; respects `RUST_LOG`.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn engine(platform: &Arc<FakePlatform>, config: EngineConfig) -> Arc<Coordinator> {
    engine_with_limits(platform, config, StaticLimits::default())
}

pub fn engine_with_limits(
    platform: &Arc<FakePlatform>,
    config: EngineConfig,
    limits: StaticLimits,
) -> Arc<Coordinator> {
    init_tracing();
    Arc::new(Coordinator::new(
        config,
        Arc::clone(platform) as Arc<dyn ProcessingPlatform>,
        Arc::new(limits),
    ))
}
