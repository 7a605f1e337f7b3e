//! # Error Handler
//!
//! The single point where exceptions become external responses. The
//! transport layer's top-level fault boundary calls [`ErrorHandler::handle`]
//! for every exception that reached it unhandled.
//!
//! ## Resolution
//!
//! ```text
//! Exception ──► exact type mapper? ──► kind mapper? ──► generic fallback
//!               (domain::code)         (ErrorKind)      (500, no internals)
//! ```
//!
//! `Unexpected` exceptions always take the fallback: their message and info
//! are logged, never rendered. A type mapper only applies while the exception
//! still has the kind its type declares; a frame built by
//! [`Exception::context`] over a cause of another kind resolves by that kind.
//!
//! ## Registration
//!
//! Mappers are registered once, at startup, through [`ErrorHandlerBuilder`].
//! Registering twice for the same key is an error; overriding requires
//! [`ErrorHandlerBuilder::replace`]. The built handler is immutable and may be
//! shared across threads, passed explicitly, or installed process-wide with
//! [`install`].

mod response;

pub use response::{ErrorBody, ErrorResponse};

use crate::config::HandlerConfig;
use crate::error::RegistrationError;
use crate::exceptions::{ErrorKind, Exception, ExceptionType};
use once_cell::sync::OnceCell;
use serde_json::Map;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

/// Builds a response for one exception. Receives the event id to echo.
pub type ResponseMapper = Arc<dyn Fn(&Exception, Uuid) -> ErrorResponse + Send + Sync>;

/// Registration key: a concrete exception type or a whole kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapperKey {
    Type(ExceptionType),
    Kind(ErrorKind),
}

impl From<ExceptionType> for MapperKey {
    fn from(ty: ExceptionType) -> Self {
        MapperKey::Type(ty)
    }
}

impl From<ErrorKind> for MapperKey {
    fn from(kind: ErrorKind) -> Self {
        MapperKey::Kind(kind)
    }
}

impl fmt::Display for MapperKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapperKey::Type(ty) => write!(f, "type {}", ty),
            MapperKey::Kind(kind) => write!(f, "kind {}", kind),
        }
    }
}

/// Which mapping produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Type(ExceptionType),
    Kind(ErrorKind),
    Fallback,
}

pub struct ErrorHandlerBuilder {
    config: HandlerConfig,
    mappers: HashMap<MapperKey, ResponseMapper>,
}

impl fmt::Debug for ErrorHandlerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.mappers.keys().map(ToString::to_string).collect();
        keys.sort();
        f.debug_struct("ErrorHandlerBuilder")
            .field("config", &self.config)
            .field("mappers", &keys)
            .finish()
    }
}

impl ErrorHandlerBuilder {
    /// Add a mapper. Fails if `key` already has one.
    pub fn register<K, F>(mut self, key: K, mapper: F) -> Result<Self, RegistrationError>
    where
        K: Into<MapperKey>,
        F: Fn(&Exception, Uuid) -> ErrorResponse + Send + Sync + 'static,
    {
        let key = Self::check(key.into())?;
        if self.mappers.contains_key(&key) {
            return Err(RegistrationError::DuplicateMapping(key));
        }
        self.mappers.insert(key, Arc::new(mapper));
        Ok(self)
    }

    /// Add or override a mapper.
    pub fn replace<K, F>(mut self, key: K, mapper: F) -> Result<Self, RegistrationError>
    where
        K: Into<MapperKey>,
        F: Fn(&Exception, Uuid) -> ErrorResponse + Send + Sync + 'static,
    {
        let key = Self::check(key.into())?;
        self.mappers.insert(key, Arc::new(mapper));
        Ok(self)
    }

    /// Map every public kind without a mapper to its conventional status,
    /// rendering the exception's own message and code.
    pub fn with_kind_defaults(mut self) -> Self {
        let expose = self.config.expose_additional_info;
        for kind in ErrorKind::ALL.into_iter().filter(ErrorKind::is_public) {
            self.mappers.entry(MapperKey::Kind(kind)).or_insert_with(|| {
                let mapper: ResponseMapper = Arc::new(move |exc: &Exception, event_id: Uuid| {
                    ErrorResponse::from_exception(exc, event_id, expose)
                });
                mapper
            });
        }
        self
    }

    pub fn build(self) -> ErrorHandler {
        ErrorHandler {
            config: self.config,
            mappers: self.mappers,
        }
    }

    fn check(key: MapperKey) -> Result<MapperKey, RegistrationError> {
        match key {
            MapperKey::Kind(ErrorKind::Unexpected) => {
                Err(RegistrationError::ReservedKind(ErrorKind::Unexpected))
            }
            key => Ok(key),
        }
    }
}

/// Immutable exception-to-response mapping table.
pub struct ErrorHandler {
    config: HandlerConfig,
    mappers: HashMap<MapperKey, ResponseMapper>,
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.mappers.keys().map(ToString::to_string).collect();
        keys.sort();
        f.debug_struct("ErrorHandler")
            .field("config", &self.config)
            .field("mappers", &keys)
            .finish()
    }
}

impl ErrorHandler {
    pub fn builder(config: HandlerConfig) -> ErrorHandlerBuilder {
        ErrorHandlerBuilder {
            config,
            mappers: HashMap::new(),
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Which mapping `handle` would use for `exc`.
    pub fn resolve(&self, exc: &Exception) -> Resolution {
        if !exc.is_public() {
            return Resolution::Fallback;
        }
        let ty = exc.exception_type();
        if exc.kind() == exc.declared_kind()
            && self.mappers.contains_key(&MapperKey::Type(ty))
        {
            return Resolution::Type(ty);
        }
        if self.mappers.contains_key(&MapperKey::Kind(exc.kind())) {
            return Resolution::Kind(exc.kind());
        }
        Resolution::Fallback
    }

    /// Produce the external response for `exc` and log it.
    ///
    /// `event_id` is the caller's request/event id; the nil UUID is used when
    /// there is none.
    pub fn handle(&self, exc: &Exception, event_id: Option<Uuid>) -> ErrorResponse {
        let event_id = event_id.unwrap_or_else(Uuid::nil);
        let resolution = self.resolve(exc);
        let mapper = match resolution {
            Resolution::Type(ty) => self.mappers.get(&MapperKey::Type(ty)),
            Resolution::Kind(kind) => self.mappers.get(&MapperKey::Kind(kind)),
            Resolution::Fallback => None,
        };

        match mapper {
            Some(mapper) => {
                if !exc.should_log() {
                    trace!(%event_id, error_code = exc.code(), "logging suppressed by domain");
                } else if self.config.log_public_errors {
                    warn!(%event_id, error_code = exc.code(), domain = %exc.domain(), kind = %exc.kind(), "{}", exc.message());
                } else {
                    debug!(%event_id, error_code = exc.code(), domain = %exc.domain(), kind = %exc.kind(), "{}", exc.message());
                }
                mapper(exc, event_id)
            }
            None => {
                error!(%event_id, error_code = exc.code(), domain = %exc.domain(), kind = %exc.kind(), "unhandled exception: {}", exc.report());
                self.fallback(event_id)
            }
        }
    }

    /// Fallback responses never carry the exception's headers.
    fn fallback(&self, event_id: Uuid) -> ErrorResponse {
        ErrorResponse::new(
            ErrorKind::Unexpected.status_code(),
            ErrorBody {
                detail: Some(self.config.unexpected_detail.clone()),
                error_code: self.config.unexpected_error_code.clone(),
                event_id,
                additional_info: Map::new(),
            },
        )
    }
}

static GLOBAL: OnceCell<ErrorHandler> = OnceCell::new();

/// Install `handler` as the process-wide handler. Only the first call wins.
pub fn install(handler: ErrorHandler) -> Result<&'static ErrorHandler, RegistrationError> {
    let mut installed = false;
    let current = GLOBAL.get_or_init(|| {
        installed = true;
        handler
    });
    if installed {
        Ok(current)
    } else {
        Err(RegistrationError::AlreadyInstalled)
    }
}

/// The process-wide handler, if one was installed.
pub fn global() -> Option<&'static ErrorHandler> {
    GLOBAL.get()
}
