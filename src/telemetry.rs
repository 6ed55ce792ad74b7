use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ValidationError,
    ClassifierError,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::ValidationError => "validation_error",
            Outcome::ClassifierError => "classifier_error",
        }
    }
}

pub struct Metrics {
    prediction_requests: IntCounterVec,
    classification_duration: Histogram,
    pub registry: Registry,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let prediction_requests = IntCounterVec::new(
            Opts::new(
                "prediction_requests_total",
                "Total number of prediction requests by outcome",
            ),
            &["outcome"],
        )?;

        let classification_duration = Histogram::with_opts(
            HistogramOpts::new(
                "classification_duration_seconds",
                "Duration of classifier calls in seconds",
            )
            .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;

        registry.register(Box::new(prediction_requests.clone()))?;
        registry.register(Box::new(classification_duration.clone()))?;

        Ok(Metrics {
            prediction_requests,
            classification_duration,
            registry,
        })
    }

    pub fn record_request(&self, outcome: Outcome) {
        self.prediction_requests
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn record_classification_duration(&self, seconds: f64) {
        self.classification_duration.observe(seconds);
    }

    pub fn request_count(&self, outcome: Outcome) -> u64 {
        self.prediction_requests
            .with_label_values(&[outcome.as_str()])
            .get()
    }
}
