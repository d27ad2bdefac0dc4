//! Provider-level composition
//!
//! A [`LoggerProvider`] owns the registered sinks and formatters and builds,
//! per category, one [`CompositeLogger`] made of fault-isolated sub-loggers:
//! the console channel, the file channel and any additional setups.

mod composite;
mod config;
mod fault;

pub use composite::CompositeLogger;
pub use config::{LoggerSetup, ScyberLogConfig};
pub use fault::FaultIsolatedLogger;

use crate::core::{
    error::{LoggerError, Result},
    logger::{Log, Logger},
    registry::KeyedRegistry,
    state_mapper::{StateMapper, TemplateMapper},
};
use crate::formatters::{Formatter, JsonFormatter, TextFormatter};
use crate::sinks::{ConsoleSink, Sink};
use std::sync::Arc;

/// Builds category loggers from registered components
pub struct LoggerProvider {
    config: ScyberLogConfig,
    sinks: KeyedRegistry<dyn Sink>,
    formatters: KeyedRegistry<dyn Formatter>,
    state_mapper: Arc<dyn StateMapper>,
}

impl LoggerProvider {
    pub fn builder() -> LoggerProviderBuilder {
        LoggerProviderBuilder::new()
    }

    pub fn config(&self) -> &ScyberLogConfig {
        &self.config
    }

    pub fn sinks(&self) -> &KeyedRegistry<dyn Sink> {
        &self.sinks
    }

    pub fn formatters(&self) -> &KeyedRegistry<dyn Formatter> {
        &self.formatters
    }

    /// The logger for `category`
    ///
    /// Fails when a setup names a formatter or sink that is not registered.
    pub fn create_logger(&self, category: &str) -> Result<CompositeLogger> {
        let members = self
            .config
            .logger_setups()
            .iter()
            .map(|setup| {
                let logger = self.build_logger(category, setup)?;
                Ok(Box::new(FaultIsolatedLogger::new(
                    logger,
                    self.config.throw_pipeline_errors,
                )) as Box<dyn Log>)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CompositeLogger::new(members))
    }

    fn build_logger(&self, category: &str, setup: &LoggerSetup) -> Result<Logger> {
        let formatter = self
            .formatters
            .get(&setup.formatter)
            .ok_or_else(|| LoggerError::formatter_not_registered(&setup.formatter))?;

        let mut builder = Logger::builder(category)
            .min_level(self.config.min_level)
            .shared_formatter(formatter)
            .shared_state_mapper(Arc::clone(&self.state_mapper));
        for key in &setup.sinks {
            let sink = self
                .sinks
                .get(key)
                .ok_or_else(|| LoggerError::sink_not_registered(key))?;
            builder = builder.shared_sink(sink);
        }
        Ok(builder.build())
    }
}

/// Fluent construction of a [`LoggerProvider`]
///
/// ```no_run
/// use scyber_log::{LoggerProvider, ScyberLogConfig};
///
/// let provider = LoggerProvider::builder()
///     .config(ScyberLogConfig::default())
///     .with_default_components()
///     .build()?;
/// let logger = provider.create_logger("app")?;
/// # Ok::<(), scyber_log::LoggerError>(())
/// ```
pub struct LoggerProviderBuilder {
    config: ScyberLogConfig,
    sinks: Vec<Arc<dyn Sink>>,
    formatters: Vec<Arc<dyn Formatter>>,
    state_mapper: Option<Arc<dyn StateMapper>>,
    default_components: bool,
}

impl LoggerProviderBuilder {
    pub fn new() -> Self {
        Self {
            config: ScyberLogConfig::default(),
            sinks: Vec::new(),
            formatters: Vec::new(),
            state_mapper: None,
            default_components: false,
        }
    }

    #[must_use]
    pub fn config(mut self, config: ScyberLogConfig) -> Self {
        self.config = config;
        self
    }

    /// Register the console, colored console and file sinks and the text and
    /// JSON formatters, configured from the provider config
    #[must_use]
    pub fn with_default_components(mut self) -> Self {
        self.default_components = true;
        self
    }

    #[must_use]
    pub fn sink(self, sink: impl Sink + 'static) -> Self {
        self.shared_sink(Arc::new(sink))
    }

    #[must_use]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatters.push(Arc::new(formatter));
        self
    }

    /// Replace the default [`TemplateMapper`]
    #[must_use]
    pub fn state_mapper(mut self, mapper: impl StateMapper + 'static) -> Self {
        self.state_mapper = Some(Arc::new(mapper));
        self
    }

    /// Fails on duplicate keys or an invalid file name template
    pub fn build(self) -> Result<LoggerProvider> {
        let mut sinks: KeyedRegistry<dyn Sink> = KeyedRegistry::new("sink");
        let mut formatters: KeyedRegistry<dyn Formatter> = KeyedRegistry::new("formatter");

        if self.default_components {
            for sink in default_sinks(&self.config)? {
                sinks.insert(sink)?;
            }
            formatters.insert(Arc::new(TextFormatter::new()))?;
            formatters.insert(Arc::new(JsonFormatter::new(self.config.json.clone())))?;
        }
        for sink in self.sinks {
            sinks.insert(sink)?;
        }
        for formatter in self.formatters {
            formatters.insert(formatter)?;
        }

        let state_mapper = self.state_mapper.unwrap_or_else(|| {
            Arc::new(TemplateMapper::new(self.config.include_original_format))
        });

        Ok(LoggerProvider {
            config: self.config,
            sinks,
            formatters,
            state_mapper,
        })
    }
}

impl Default for LoggerProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_sinks(config: &ScyberLogConfig) -> Result<Vec<Arc<dyn Sink>>> {
    let mut sinks: Vec<Arc<dyn Sink>> = vec![Arc::new(ConsoleSink::new())];
    #[cfg(feature = "console")]
    sinks.push(Arc::new(crate::sinks::ColoredConsoleSink::new()));
    #[cfg(feature = "file")]
    sinks.push(Arc::new(crate::sinks::FileSink::new(
        config.file_name_template.as_str(),
    )?));
    #[cfg(not(feature = "file"))]
    let _ = config;
    Ok(sinks)
}
