// Spell-check collaborator
//
// The only component with external latency. Implementations must bound every
// call with a timeout and report failures as `SpellCheckError`; the spelling
// check turns any error into a passed result so one slow request never sinks
// a validation run.

use crate::error::SpellCheckError;
use serde::{Deserialize, Serialize};

/// A misspelled word with the service's suggestions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellingError {
    pub word: String,
    #[serde(default, alias = "s")]
    pub suggestions: Vec<String>,
}

pub trait SpellChecker: Send + Sync {
    fn check(&self, text: &str) -> Result<Vec<SpellingError>, SpellCheckError>;

    /// Checker name for debugging/logging
    fn name(&self) -> &str;
}

#[cfg(feature = "http-speller")]
pub use http::HttpSpellChecker;

#[cfg(feature = "http-speller")]
mod http {
    use super::{SpellChecker, SpellingError};
    use crate::config::SpellCheckConfig;
    use crate::error::SpellCheckError;
    use std::io::ErrorKind;
    use std::time::Duration;

    /// Speller web service client (form-encoded POST, JSON array response)
    pub struct HttpSpellChecker {
        agent: ureq::Agent,
        endpoint: String,
        lang: Option<String>,
        timeout: Duration,
    }

    impl HttpSpellChecker {
        pub fn new(config: &SpellCheckConfig) -> Self {
            let timeout = Duration::from_millis(config.timeout_ms);
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            Self {
                agent,
                endpoint: config.endpoint.clone(),
                lang: config.lang.clone(),
                timeout,
            }
        }
    }

    impl SpellChecker for HttpSpellChecker {
        fn check(&self, text: &str) -> Result<Vec<SpellingError>, SpellCheckError> {
            let mut form = vec![("text", text), ("options", "0")];
            if let Some(lang) = self.lang.as_deref() {
                form.push(("lang", lang));
            }

            let response = match self.agent.post(&self.endpoint).send_form(&form) {
                Ok(response) => response,
                Err(ureq::Error::Status(code, _)) => return Err(SpellCheckError::Status(code)),
                Err(ureq::Error::Transport(transport)) => {
                    return Err(if is_timeout(&transport) {
                        SpellCheckError::Timeout(self.timeout)
                    } else {
                        SpellCheckError::Transport(transport.to_string())
                    });
                }
            };

            let body = response
                .into_string()
                .map_err(|e| SpellCheckError::InvalidResponse(e.to_string()))?;
            serde_json::from_str(&body).map_err(|e| SpellCheckError::InvalidResponse(e.to_string()))
        }

        fn name(&self) -> &str {
            "http-speller"
        }
    }

    /// Walk the transport error's sources looking for an I/O timeout
    fn is_timeout(transport: &ureq::Transport) -> bool {
        let mut source = std::error::Error::source(transport);
        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<std::io::Error>() {
                // read timeouts surface as WouldBlock on unix sockets
                return matches!(io.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock);
            }
            source = err.source();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_response_shape() {
        let body = r#"[{"code":1,"pos":0,"row":0,"col":0,"len":6,"word":"teh","s":["the","tech"]}]"#;
        let errors: Vec<SpellingError> = serde_json::from_str(body).unwrap();
        assert_eq!(
            errors,
            vec![SpellingError {
                word: "teh".to_string(),
                suggestions: vec!["the".to_string(), "tech".to_string()],
            }]
        );
    }

    #[cfg(feature = "http-speller")]
    #[test]
    fn test_unreachable_service_is_an_error() {
        let checker = HttpSpellChecker::new(&crate::config::SpellCheckConfig {
            endpoint: "http://127.0.0.1:9/unreachable".to_string(),
            timeout_ms: 200,
            ..Default::default()
        });
        assert!(checker.check("hello").is_err());
    }

    #[cfg(feature = "http-speller")]
    #[test]
    fn test_silent_service_times_out() {
        // Accepted by the kernel backlog, never answered
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let checker = HttpSpellChecker::new(&crate::config::SpellCheckConfig {
            endpoint: format!("http://{}/check", address),
            timeout_ms: 150,
            ..Default::default()
        });
        assert_eq!(
            checker.check("hello"),
            Err(SpellCheckError::Timeout(std::time::Duration::from_millis(150)))
        );
        drop(listener);
    }
}
