//! Command execution.

use crate::Commands;
use colored::Colorize;
use riemann_client::Client;
use riemann_protocol::{Event, ProtocolError};
use thiserror::Error;

/// Why a command produced no usable result.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Malformed command-line input.
    #[error("{0}")]
    Usage(String),

    /// The server did not confirm the event.
    #[error("{0}")]
    NotAcknowledged(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Executes a command and returns the formatted output.
pub async fn execute(client: &mut Client, cmd: Commands) -> Result<String, CommandError> {
    match cmd {
        Commands::Send {
            service,
            metric,
            state,
            event_host,
            description,
            ttl,
            tags,
            attributes,
            attributes_json,
        } => {
            let mut event = Event::new();
            event.set_service(service.as_str());
            if let Some(m) = metric {
                event.set_metric(m);
            }
            if let Some(s) = state {
                event.set_state(s);
            }
            if let Some(h) = event_host {
                event.set_host(h);
            }
            if let Some(d) = description {
                event.set_description(d);
            }
            if let Some(t) = ttl {
                event.set_ttl(t);
            }
            event.set_tags(tags);
            event.set_attributes(parse_attributes(&attributes)?);
            if let Some(json) = attributes_json {
                let value: serde_json::Value = serde_json::from_str(&json)
                    .map_err(|e| CommandError::Usage(format!("invalid --attributes JSON: {}", e)))?;
                event.set_attributes_json(&value)?;
            }

            if client.send(event).await? {
                Ok(format!("{} {}", "ok".green(), service.cyan()))
            } else if !client.config().transport.is_reliable() {
                // Nothing comes back over UDP
                Ok(format!("{} {} (udp, unconfirmed)", "sent".yellow(), service.cyan()))
            } else {
                Err(CommandError::NotAcknowledged(format!(
                    "{} {}",
                    "not acknowledged".red(),
                    service.cyan()
                )))
            }
        }

        Commands::Query { query } => {
            let events = client.query(query).await?;
            Ok(format_events(&events))
        }
    }
}

/// Splits `key=value` arguments.
fn parse_attributes(args: &[String]) -> Result<Vec<(String, String)>, CommandError> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| {
                    CommandError::Usage(format!("attribute must be key=value, got '{}'", arg))
                })
        })
        .collect()
}

/// One JSON object per line.
fn format_events(events: &[Event]) -> String {
    events
        .iter()
        .map(|e| e.to_json().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use riemann_client::ConnectionConfig;

    #[test]
    fn test_parse_attributes() {
        let parsed =
            parse_attributes(&["env=prod".to_string(), "url=http://x/?a=b".to_string()]).unwrap();
        assert_eq!(parsed[0], ("env".to_string(), "prod".to_string()));
        assert_eq!(parsed[1], ("url".to_string(), "http://x/?a=b".to_string()));

        let err = parse_attributes(&["novalue".to_string()]).unwrap_err();
        assert!(err.to_string().contains("key=value"));
    }

    fn send_command(service: &str) -> Commands {
        Commands::Send {
            service: service.to_string(),
            metric: Some(1.5),
            state: None,
            event_host: None,
            description: None,
            ttl: None,
            tags: vec!["cli".to_string()],
            attributes: vec!["env=test".to_string()],
            attributes_json: None,
        }
    }

    #[tokio::test]
    async fn test_send_over_udp_is_unconfirmed() {
        let server = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();
        let mut client = Client::new(ConnectionConfig::udp("127.0.0.1", port));

        let output = execute(&mut client, send_command("heartbeat")).await.unwrap();
        assert!(output.contains("unconfirmed"));

        let mut buf = [0u8; 512];
        let (n, _) = server.recv_from(&mut buf).await.unwrap();
        let message = riemann_protocol::Message::from_raw(&buf[..n]).unwrap();
        let event = &message.events()[0];
        assert_eq!(event.service(), Some("heartbeat"));
        assert_eq!(event.attribute("env"), Some("test"));
    }

    #[tokio::test]
    async fn test_send_over_tcp_not_acknowledged() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let mut client = Client::new(ConnectionConfig::tcp("127.0.0.1", port));

        let err = execute(&mut client, send_command("cpu")).await.unwrap_err();
        assert!(matches!(err, CommandError::NotAcknowledged(_)));
    }

    #[test]
    fn test_format_events() {
        let mut a = Event::new();
        a.set_service("cpu");
        let mut b = Event::new();
        b.set_service("mem");

        let out = format_events(&[a, b]);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"service\":\"cpu\""));
        assert!(lines[1].contains("\"service\":\"mem\""));
    }
}
