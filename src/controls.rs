use crate::domain::SPEED_RANGE;
use crate::flight::{SequencerCommand, Status};
use crate::token::{LinePrompt, TokenPrompt, TokenStore};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncBufRead;
use tokio::sync::mpsc::Sender;
use tokio::sync::watch::Receiver as WatchReceiver;
use tracing::{debug, info, instrument, warn};

pub const MAX_PITCH: f64 = 85.0;

const HELP: &str =
    "Commands: start | stop | reset | speed <0.1-10> | height <meters> | pitch <0-85> | token <access token> | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    Start,
    Stop,
    Reset,
    Speed(f64),
    Height(f64),
    Pitch(f64),
    Token(String),
    Help,
    Quit,
}

impl FromStr for ControlCommand {
    type Err = ParseControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let Some(name) = parts.next() else {
            return Err(ParseControlError::Empty);
        };

        let command = match name.to_lowercase().as_str() {
            "start" => ControlCommand::Start,
            "stop" => ControlCommand::Stop,
            "reset" => ControlCommand::Reset,
            "help" => ControlCommand::Help,
            "quit" | "exit" => ControlCommand::Quit,
            "speed" => {
                let speed = parse_value("speed", parts.next())?;
                if !SPEED_RANGE.contains(&speed) {
                    return Err(ParseControlError::OutOfRange { command: "speed", value: speed });
                }
                ControlCommand::Speed(speed)
            }
            "height" => {
                let height = parse_value("height", parts.next())?;
                if !(height > 0.0) {
                    return Err(ParseControlError::OutOfRange { command: "height", value: height });
                }
                ControlCommand::Height(height)
            }
            "pitch" => {
                let pitch = parse_value("pitch", parts.next())?;
                if !(0.0..=MAX_PITCH).contains(&pitch) {
                    return Err(ParseControlError::OutOfRange { command: "pitch", value: pitch });
                }
                ControlCommand::Pitch(pitch)
            }
            "token" => {
                let token = parts.next().ok_or(ParseControlError::MissingValue("token"))?;
                ControlCommand::Token(token.to_string())
            }
            _ => return Err(ParseControlError::UnknownCommand(name.to_string())),
        };

        match parts.next() {
            Some(extra) => Err(ParseControlError::UnexpectedArgument(extra.to_string())),
            None => Ok(command),
        }
    }
}

fn parse_value(command: &'static str, value: Option<&str>) -> Result<f64, ParseControlError> {
    let value = value.ok_or(ParseControlError::MissingValue(command))?;
    let parsed = value.trim_end_matches(['x', 'm', '°']).parse::<f64>().map_err(|_| ParseControlError::InvalidValue {
        command,
        value: value.to_string(),
    })?;

    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(ParseControlError::InvalidValue {
            command,
            value: value.to_string(),
        })
    }
}

impl ControlCommand {
    fn to_sequencer_command(&self) -> Option<SequencerCommand> {
        match self {
            ControlCommand::Start => Some(SequencerCommand::Start),
            ControlCommand::Stop => Some(SequencerCommand::Stop),
            ControlCommand::Reset => Some(SequencerCommand::Reset),
            ControlCommand::Speed(speed) => Some(SequencerCommand::SetSpeed(*speed)),
            ControlCommand::Height(height) => Some(SequencerCommand::SetHeight(*height)),
            ControlCommand::Pitch(pitch) => Some(SequencerCommand::SetPitch(*pitch)),
            ControlCommand::Token(_) | ControlCommand::Help | ControlCommand::Quit => None,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseControlError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("missing value for '{0}'")]
    MissingValue(&'static str),
    #[error("invalid value '{value}' for '{command}'")]
    InvalidValue { command: &'static str, value: String },
    #[error("value {value} is out of range for '{command}'")]
    OutOfRange { command: &'static str, value: f64 },
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

/// The terminal surface: forwards commands to the sequencer and new access tokens to the map
/// session, and asks for a token whenever the current one is rejected.
#[derive(Debug)]
pub struct Controls {
    store: Arc<dyn TokenStore>,
    sequencer_tx: Sender<SequencerCommand>,
    token_tx: Sender<String>,
    status_rx: WatchReceiver<Status>,
}

impl Controls {
    pub fn new(
        store: Arc<dyn TokenStore>,
        sequencer_tx: Sender<SequencerCommand>,
        token_tx: Sender<String>,
        status_rx: WatchReceiver<Status>,
    ) -> Self {
        Controls {
            store,
            sequencer_tx,
            token_tx,
            status_rx,
        }
    }

    /// Reads input until it closes, the user quits or the receiving side is gone.
    #[instrument(skip_all)]
    pub async fn listen<R: AsyncBufRead + Unpin + Send>(mut self, mut prompt: LinePrompt<R>) {
        println!("{}", HELP);
        let mut status_open = true;

        loop {
            tokio::select! {
                biased;
                changed = self.status_rx.changed(), if status_open => {
                    if changed.is_err() {
                        status_open = false;
                        continue;
                    }

                    let token_rejected = *self.status_rx.borrow_and_update() == Status::InvalidToken;
                    if token_rejected && !self.ask_for_token(&mut prompt).await {
                        break;
                    }
                }
                line = prompt.next_line() => match line {
                    Some(Ok(line)) => {
                        if !self.handle_line(&line).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!("⚠️ Unable to read input: {}", e);
                        break;
                    }
                    None => break,
                },
            }
        }

        info!("🎛️ Stopped reading input");
    }

    /// Returns `false` once no further input should be read.
    async fn handle_line(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }

        let command = match line.parse::<ControlCommand>() {
            Ok(command) => command,
            Err(e) => {
                warn!("⚠️ {}, type 'help' for the list of commands", e);
                return true;
            }
        };

        debug!(?command, "🎛️ Received control command");
        match command {
            ControlCommand::Quit => false,
            ControlCommand::Help => {
                println!("{}", HELP);
                true
            }
            ControlCommand::Token(token) => self.send_token(token).await,
            command => {
                let Some(sequencer_command) = command.to_sequencer_command() else {
                    return true;
                };

                if self.sequencer_tx.send(sequencer_command).await.is_err() {
                    warn!("⚠️ The sequencer is gone, no longer reading input");
                    return false;
                }
                true
            }
        }
    }

    async fn ask_for_token<R: AsyncBufRead + Unpin + Send>(&mut self, prompt: &mut LinePrompt<R>) -> bool {
        let hint = self.store.get().await.unwrap_or_else(|e| {
            warn!("⚠️ Unable to read the stored access token: {}", e);
            None
        });

        match prompt.ask(hint.as_deref()).await {
            Some(token) => self.send_token(token).await,
            None => false,
        }
    }

    async fn send_token(&mut self, token: String) -> bool {
        if self.token_tx.send(token).await.is_err() {
            warn!("⚠️ The map session is gone, no longer reading input");
            return false;
        }

        info!("🔑 Reloading the map with the new access token");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MemoryTokenStore;
    use rstest::rstest;
    use std::time::Duration;
    use tokio::io::{AsyncWriteExt, BufReader};
    use tokio::sync::mpsc::{self, Receiver};
    use tokio::sync::watch::{self, Sender as WatchSender};
    use tokio::time::timeout;

    struct Harness {
        controls: Controls,
        sequencer_rx: Receiver<SequencerCommand>,
        token_rx: Receiver<String>,
        status_tx: WatchSender<Status>,
    }

    fn controls() -> Harness {
        let (sequencer_tx, sequencer_rx) = mpsc::channel(8);
        let (token_tx, token_rx) = mpsc::channel(8);
        let (status_tx, status_rx) = watch::channel(Status::MapLoaded);
        let store = Arc::new(MemoryTokenStore::with_token("pk.rejected"));

        Harness {
            controls: Controls::new(store, sequencer_tx, token_tx, status_rx),
            sequencer_rx,
            token_rx,
            status_tx,
        }
    }

    #[rstest]
    #[case("start", ControlCommand::Start)]
    #[case("  STOP ", ControlCommand::Stop)]
    #[case("reset", ControlCommand::Reset)]
    #[case("speed 1.5", ControlCommand::Speed(1.5))]
    #[case("speed 2.0x", ControlCommand::Speed(2.0))]
    #[case("speed 0.1", ControlCommand::Speed(0.1))]
    #[case("height 500m", ControlCommand::Height(500.0))]
    #[case("pitch 45", ControlCommand::Pitch(45.0))]
    #[case("token pk.abc", ControlCommand::Token("pk.abc".to_string()))]
    #[case("exit", ControlCommand::Quit)]
    fn parses_commands(#[case] input: &str, #[case] expected: ControlCommand) {
        assert_eq!(input.parse::<ControlCommand>(), Ok(expected));
    }

    #[rstest]
    #[case("", ParseControlError::Empty)]
    #[case("fly", ParseControlError::UnknownCommand("fly".to_string()))]
    #[case("speed", ParseControlError::MissingValue("speed"))]
    #[case("token", ParseControlError::MissingValue("token"))]
    #[case("speed fast", ParseControlError::InvalidValue { command: "speed", value: "fast".to_string() })]
    #[case("speed inf", ParseControlError::InvalidValue { command: "speed", value: "inf".to_string() })]
    #[case("speed 0", ParseControlError::OutOfRange { command: "speed", value: 0.0 })]
    #[case("speed 3e-19", ParseControlError::OutOfRange { command: "speed", value: 3e-19 })]
    #[case("speed 10.5", ParseControlError::OutOfRange { command: "speed", value: 10.5 })]
    #[case("height -10", ParseControlError::OutOfRange { command: "height", value: -10.0 })]
    #[case("pitch 90", ParseControlError::OutOfRange { command: "pitch", value: 90.0 })]
    #[case("start now", ParseControlError::UnexpectedArgument("now".to_string()))]
    fn rejects_invalid_commands(#[case] input: &str, #[case] expected: ParseControlError) {
        assert_eq!(input.parse::<ControlCommand>(), Err(expected));
    }

    #[test_log::test(tokio::test)]
    async fn listen_forwards_commands_until_quit() {
        let mut harness = controls();
        let input = "start\nbogus\n\nspeed 2\ntoken pk.typed\nquit\nstop\n".as_bytes();

        harness.controls.listen(LinePrompt::new(input)).await;

        assert!(matches!(harness.sequencer_rx.recv().await, Some(SequencerCommand::Start)));
        assert!(matches!(harness.sequencer_rx.recv().await, Some(SequencerCommand::SetSpeed(speed)) if speed == 2.0));
        assert!(harness.sequencer_rx.recv().await.is_none());
        assert_eq!(harness.token_rx.recv().await, Some("pk.typed".to_string()));
    }

    #[test_log::test(tokio::test)]
    async fn listen_asks_for_a_new_token_when_the_token_is_rejected() {
        let mut harness = controls();
        harness.status_tx.send_replace(Status::InvalidToken);
        let input = "\npk.replacement\nquit\n".as_bytes();

        harness.controls.listen(LinePrompt::new(input)).await;

        assert_eq!(harness.token_rx.recv().await, Some("pk.replacement".to_string()));
        assert!(harness.token_rx.recv().await.is_none());
        assert!(harness.sequencer_rx.recv().await.is_none());
    }

    #[test_log::test(tokio::test)]
    async fn listen_stops_when_the_sequencer_is_gone() {
        let harness = controls();
        drop(harness.sequencer_rx);
        let (mut writer, reader) = tokio::io::duplex(64);
        writer.write_all(b"start\n").await.unwrap();

        // The writer stays open, so only the failed send can end the loop
        let result = timeout(Duration::from_secs(5), harness.controls.listen(LinePrompt::new(BufReader::new(reader)))).await;

        assert!(result.is_ok());
        drop(writer);
    }
}
