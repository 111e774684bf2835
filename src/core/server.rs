use crate::core::protocol::{handshake, Diagnostic, Request, Response};
use crate::core::provider::Provider;
use crate::utils::error::{ProviderError, Result};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Runs the JSON-lines protocol loop over any reader/writer pair.
pub struct PluginServer {
    provider: Provider,
}

impl PluginServer {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        writer.write_all(format!("{}\n", handshake()).as_bytes()).await?;
        writer.flush().await?;
        tracing::info!("🚀 Plugin server ready");

        let mut buf = Vec::new();
        let mut served = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            // 非 UTF-8 的行也只回錯誤，不中斷連線
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    tracing::warn!("Request line is not valid UTF-8: {}", e);
                    let response = Response::failure(&ProviderError::InvalidInputError {
                        message: format!("request line is not valid UTF-8: {}", e),
                    });
                    Self::write_response(&mut writer, &response).await?;
                    served += 1;
                    continue;
                }
            };

            if line.is_empty() {
                continue;
            }

            let (response, stop) = match serde_json::from_str::<Request>(line) {
                Ok(Request::Stop) => (Response::success(Value::Null, Vec::new()), true),
                Ok(request) => (self.handle(request).await, false),
                Err(e) => {
                    tracing::warn!("Malformed request line: {}", e);
                    (Response::failure(&ProviderError::SerializationError(e)), false)
                }
            };

            Self::write_response(&mut writer, &response).await?;
            served += 1;

            if stop {
                tracing::info!("Stop requested");
                break;
            }
        }

        tracing::info!("✅ Plugin server finished after {} requests", served);
        Ok(())
    }

    async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<()> {
        let mut encoded = serde_json::to_string(response)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    pub async fn handle(&mut self, request: Request) -> Response {
        let operation = request.operation();

        match self.dispatch(request).await {
            Ok((result, diagnostics)) => Response::success(result, diagnostics),
            Err(e) => {
                tracing::error!(
                    "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
                    operation,
                    e,
                    e.category(),
                    e.severity()
                );
                Response::failure(&e)
            }
        }
    }

    async fn dispatch(&mut self, request: Request) -> Result<(Value, Vec<Diagnostic>)> {
        let provider = &mut self.provider;

        let result = match request {
            Request::GetSchema => serde_json::to_value(provider.schema())?,
            Request::Configure { config } => {
                let warnings = provider.configure(&config)?;
                return Ok((Value::Null, warnings));
            }
            Request::Validate {
                kind,
                type_name,
                config,
            } => {
                provider.validate(kind, &type_name, &config)?;
                Value::Null
            }
            Request::ReadDataSource { type_name, config } => {
                provider.read_data_source(&type_name, &config).await?
            }
            Request::Plan {
                type_name,
                prior_state,
                config,
            } => serde_json::to_value(provider.plan(&type_name, prior_state.as_ref(), &config)?)?,
            Request::Create { type_name, config } => provider.create(&type_name, &config).await?,
            Request::Read { type_name, state } => provider
                .read(&type_name, &state)
                .await?
                .unwrap_or(Value::Null),
            Request::Update {
                type_name,
                prior_state,
                config,
            } => provider.update(&type_name, &prior_state, &config).await?,
            Request::Delete { type_name, state } => {
                provider.delete(&type_name, &state).await?;
                Value::Null
            }
            Request::Import { type_name, id } => provider.import(&type_name, &id).await?,
            Request::Stop => Value::Null,
        };

        Ok((result, Vec::new()))
    }
}
