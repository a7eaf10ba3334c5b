use std::sync::Arc;
use std::time::Duration;

use foodie_config::Config;
use foodie_exec::{ExecutionPoller, JobStatus, JulepClient, PollPolicy};
use foodie_model::{CityOutcome, OutcomeSummary, ResultParser, TourRequestBuilder};
use foodie_utils::TourError;
use foodie_utils::logging::city_span;
use foodie_weather::{OpenMeteoApi, WeatherResolver};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, warn};

/// Fan-out bound and pacing for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Cities processed at once; 1 reproduces strictly sequential processing
    pub max_concurrency: usize,
    /// Delay after each city, held inside its concurrency slot
    pub pacing_delay: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            pacing_delay: Duration::from_secs(1),
        }
    }
}

impl OrchestratorSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrency: config.max_concurrency(),
            pacing_delay: config.pacing_delay(),
        }
    }
}

struct Pipeline {
    resolver: WeatherResolver,
    builder: TourRequestBuilder,
    poller: ExecutionPoller,
    settings: OrchestratorSettings,
}

/// Drives every city through the pipeline and collects ordered outcomes.
///
/// Per-city failures of any kind become `CityOutcome::Failure`; a panic in a
/// city task is re-raised on the caller.
#[derive(Clone)]
pub struct TourOrchestrator {
    pipeline: Arc<Pipeline>,
}

impl TourOrchestrator {
    pub fn new(
        resolver: WeatherResolver,
        poller: ExecutionPoller,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                resolver,
                builder: TourRequestBuilder::new(),
                poller,
                settings,
            }),
        }
    }

    /// Wire Open-Meteo and Julep adapters from configuration.
    ///
    /// # Errors
    ///
    /// Returns `TourError::Misconfiguration` when the API key or agent id is
    /// missing or an endpoint URL is malformed.
    pub fn from_config(config: &Config) -> Result<Self, TourError> {
        let weather = OpenMeteoApi::from_config(config)?;
        let execution = JulepClient::from_config(config)?;

        Ok(Self::new(
            WeatherResolver::new(Arc::new(weather), config.geocode_cache_ttl()),
            ExecutionPoller::new(Arc::new(execution), PollPolicy::from_config(config)),
            OrchestratorSettings::from_config(config),
        ))
    }

    pub async fn run(&self, cities: &[String]) -> Vec<CityOutcome> {
        self.run_with_cancel(cities, &CancellationToken::new())
            .await
    }

    /// Process `cities` and return one outcome per city in input order.
    ///
    /// Slots are granted in input order. Cancelling `cancel` stops new cities
    /// from starting and interrupts in-flight ones; every city without a
    /// result is reported as `Failure(city, "cancelled")`.
    pub async fn run_with_cancel(
        &self,
        cities: &[String],
        cancel: &CancellationToken,
    ) -> Vec<CityOutcome> {
        let settings = self.pipeline.settings;
        let semaphore = Arc::new(Semaphore::new(settings.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();

        info!(
            cities = cities.len(),
            max_concurrency = settings.max_concurrency,
            "Starting tour generation"
        );

        for (index, city) in cities.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let pipeline = Arc::clone(&self.pipeline);
            let city = city.clone();
            let token = cancel.child_token();

            tasks.spawn(async move {
                let span = city_span(&city, index);
                let outcome = pipeline
                    .process_city(&city, &token)
                    .instrument(span)
                    .await;
                pipeline.pace(&token).await;
                drop(permit);
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<CityOutcome>> = vec![None; cities.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => warn!(error = %e, "City task ended without an outcome"),
            }
        }

        let outcomes: Vec<CityOutcome> = slots
            .into_iter()
            .zip(cities)
            .map(|(slot, city)| {
                slot.unwrap_or_else(|| CityOutcome::failure(city, TourError::Cancelled.to_string()))
            })
            .collect();

        let summary = OutcomeSummary::from_outcomes(&outcomes);
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Tour generation finished"
        );

        outcomes
    }
}

impl Pipeline {
    async fn process_city(&self, city: &str, cancel: &CancellationToken) -> CityOutcome {
        let weather = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return CityOutcome::failure(city, TourError::Cancelled.to_string());
            }
            weather = self.resolver.resolve(city) => weather,
        };

        if !weather.is_usable() {
            let reason = weather.error().unwrap_or("temperature unavailable");
            info!(reason, "Skipping generation; weather unavailable");
            return CityOutcome::failure(city, reason);
        }

        let request = self.builder.build(city, weather);
        let result = self.poller.run_with_cancel(&request, cancel).await;

        if result.status != JobStatus::Succeeded {
            let reason = result
                .error
                .unwrap_or_else(|| "execution did not succeed".to_string());
            warn!(reason = %reason, "Generation failed");
            return CityOutcome::failure(city, reason);
        }

        match ResultParser::parse(result.payload.as_deref().unwrap_or_default()) {
            Ok(itinerary) => {
                info!(dining = %request.dining_type, "Itinerary generated");
                CityOutcome::Success(itinerary)
            }
            Err(e) => {
                warn!(error = %e, "Generated payload rejected");
                CityOutcome::failure(city, e.to_string())
            }
        }
    }

    async fn pace(&self, cancel: &CancellationToken) {
        if self.settings.pacing_delay.is_zero() {
            return;
        }
        tokio::select! {
            () = cancel.cancelled() => {}
            () = tokio::time::sleep(self.settings.pacing_delay) => {}
        }
    }
}
