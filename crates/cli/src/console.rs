//! Interactive console session.
//!
//! Stands in for a real host: participants join, chat and flip toggles from
//! stdin, and everything the bridge sends is printed to stdout. The bridge is
//! ticked on the main task at [`TICKS_PER_SECOND`].

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    anyhow::{Context, Result, bail},
    staffchat_channels::{InboundRelayMessage, NoopRelay, RelayAuthor, RelayTransport, WebhookRelay},
    staffchat_common::{Channel, ParticipantId, ToggleAxis},
    staffchat_config::{NotificationSound, StaffChatConfig},
    staffchat_profiles::{ProfileStore, store_file::FileStore},
    staffchat_routing::{
        Host, MessageSource, NotificationSink, Participant, Participants, PermissionOracle,
        StaffChat, TICKS_PER_SECOND, format::strip_colors,
    },
    tokio::{
        io::{AsyncBufReadExt, BufReader},
        time::MissedTickBehavior,
    },
    tracing::{info, warn},
    uuid::Uuid,
};

use crate::profile_commands::describe;

const HELP: &str = "\
commands:
  join <name> [staff] [team]                    connect a participant
  leave <name>                                  disconnect a participant
  say <name> <message>                          chat as a participant
  staff <message> | team <message>             send as the console
  toggle <name> <channel> <axis> <on|off> [quiet]
                                                axis: auto, receiving, mute
  grant <name> <channel> | revoke <name> <channel>
  relay <channel-id> <author> <message>         simulate a relay message
  profile <name> | who | flush | reload | help | quit
";

// ── Host ────────────────────────────────────────────────────────────────────

struct Member {
    participant: Participant,
    staff: bool,
    team: bool,
    online: bool,
}

/// Participants known to this session. Ids are derived from names, so
/// persisted profiles follow a name across sessions.
#[derive(Default)]
pub struct ConsoleHost {
    members: Mutex<Vec<Member>>,
}

fn participant_id(name: &str) -> ParticipantId {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.to_lowercase().as_bytes())
}

impl ConsoleHost {
    fn host(self: &Arc<Self>, relay: Arc<dyn RelayTransport>) -> Host {
        Host {
            permissions: Arc::clone(self) as Arc<dyn PermissionOracle>,
            participants: Arc::clone(self) as Arc<dyn Participants>,
            sink: Arc::clone(self) as Arc<dyn NotificationSink>,
            relay,
        }
    }

    fn with_member<R>(&self, name: &str, f: impl FnOnce(&mut Member) -> R) -> Result<R> {
        let id = participant_id(name);
        let mut members = self.members.lock().unwrap_or_else(|e| e.into_inner());
        let member = members
            .iter_mut()
            .find(|m| m.participant.id == id)
            .with_context(|| format!("unknown participant: {name}"))?;
        Ok(f(member))
    }

    /// Connect `name`, replacing their access.
    fn join(&self, name: &str, staff: bool, team: bool) -> Participant {
        let participant = Participant::new(participant_id(name), name);
        let mut members = self.members.lock().unwrap_or_else(|e| e.into_inner());
        members.retain(|m| m.participant.id != participant.id);
        members.push(Member {
            participant: participant.clone(),
            staff,
            team,
            online: true,
        });
        participant
    }

    fn leave(&self, name: &str) -> Result<Participant> {
        self.with_member(name, |m| {
            m.online = false;
            m.participant.clone()
        })
    }

    fn member(&self, name: &str) -> Result<Participant> {
        self.with_member(name, |m| m.participant.clone())
    }

    fn online_member(&self, name: &str) -> Result<Participant> {
        let (participant, online) = self.with_member(name, |m| (m.participant.clone(), m.online))?;
        if !online {
            bail!("{name} is not online");
        }
        Ok(participant)
    }

    fn set_access(&self, name: &str, channel: Channel, granted: bool) -> Result<Participant> {
        self.with_member(name, |m| {
            match channel {
                Channel::Staff => m.staff = granted,
                Channel::Team => m.team = granted,
            }
            m.participant.clone()
        })
    }

    fn access(&self, id: ParticipantId, channel: Channel) -> bool {
        let members = self.members.lock().unwrap_or_else(|e| e.into_inner());
        members
            .iter()
            .find(|m| m.participant.id == id)
            .is_some_and(|m| match channel {
                Channel::Staff => m.staff,
                Channel::Team => m.team,
            })
    }

    fn print_who(&self) {
        let members = self.members.lock().unwrap_or_else(|e| e.into_inner());
        if members.is_empty() {
            println!("nobody has joined yet");
            return;
        }
        for m in members.iter() {
            println!(
                "  {:<16} {:<8} staff: {:<5} team: {}",
                m.participant.name,
                if m.online { "online" } else { "offline" },
                m.staff,
                m.team
            );
        }
    }
}

impl PermissionOracle for ConsoleHost {
    fn has_staff_access(&self, id: ParticipantId) -> bool {
        self.access(id, Channel::Staff)
    }

    fn has_team_access(&self, id: ParticipantId) -> bool {
        self.access(id, Channel::Team)
    }
}

impl Participants for ConsoleHost {
    fn online(&self) -> Vec<Participant> {
        let members = self.members.lock().unwrap_or_else(|e| e.into_inner());
        members
            .iter()
            .filter(|m| m.online)
            .map(|m| m.participant.clone())
            .collect()
    }

    fn resend_chat(&self, sender: &Participant, message: &str) {
        println!("<{}> {message}", sender.name);
    }
}

fn print_lines(label: &str, text: &str) {
    for line in strip_colors(text).lines() {
        println!("[{label}] {line}");
    }
}

impl NotificationSink for ConsoleHost {
    fn notify(&self, recipient: &Participant, text: &str, sound: Option<&NotificationSound>) {
        let label = match sound {
            Some(sound) => format!("to {} ({})", recipient.name, sound.name),
            None => format!("to {}", recipient.name),
        };
        print_lines(&label, text);
    }

    fn notify_console(&self, text: &str) {
        print_lines("console", text);
    }
}

// ── Commands ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Join {
        name: String,
        staff: bool,
        team: bool,
    },
    Leave {
        name: String,
    },
    Say {
        name: String,
        message: String,
    },
    Console {
        channel: Channel,
        message: String,
    },
    Toggle {
        name: String,
        channel: Channel,
        axis: ToggleAxis,
        enabled: bool,
        quiet: bool,
    },
    Access {
        name: String,
        channel: Channel,
        granted: bool,
    },
    Relay {
        channel_id: String,
        author: String,
        message: String,
    },
    Profile {
        name: String,
    },
    Who,
    Flush,
    Reload,
    Help,
    Quit,
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn required<'a>(word: &'a str, what: &str) -> Result<&'a str> {
    if word.is_empty() {
        bail!("missing {what}");
    }
    Ok(word)
}

fn parse_switch(word: &str) -> Result<bool> {
    match word.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "enable" => Ok(true),
        "off" | "false" | "no" | "disable" => Ok(false),
        other => bail!("expected on or off, got {other:?}"),
    }
}

fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim().trim_start_matches('/');
    let (verb, rest) = split_word(line);

    let command = match verb.to_ascii_lowercase().as_str() {
        "join" => {
            let (name, flags) = split_word(rest);
            let name = required(name, "name")?.to_string();
            let (mut staff, mut team) = (false, false);
            for flag in flags.split_whitespace() {
                match flag.parse::<Channel>()? {
                    Channel::Staff => staff = true,
                    Channel::Team => team = true,
                }
            }
            Command::Join { name, staff, team }
        },
        "leave" => Command::Leave {
            name: required(rest, "name")?.to_string(),
        },
        "say" => {
            let (name, message) = split_word(rest);
            Command::Say {
                name: required(name, "name")?.to_string(),
                message: required(message, "message")?.to_string(),
            }
        },
        "staff" | "team" => Command::Console {
            channel: verb.parse()?,
            message: required(rest, "message")?.to_string(),
        },
        "toggle" => {
            let words: Vec<&str> = rest.split_whitespace().collect();
            let [name, channel, axis, switch, modifiers @ ..] = words.as_slice() else {
                bail!("usage: toggle <name> <channel> <axis> <on|off> [quiet]");
            };
            let quiet = match modifiers {
                [] => false,
                ["quiet"] => true,
                _ => bail!("unexpected arguments: {}", modifiers.join(" ")),
            };
            Command::Toggle {
                name: (*name).to_string(),
                channel: channel.parse()?,
                axis: axis.parse()?,
                enabled: parse_switch(switch)?,
                quiet,
            }
        },
        verb @ ("grant" | "revoke") => {
            let (name, channel) = split_word(rest);
            Command::Access {
                name: required(name, "name")?.to_string(),
                channel: required(channel, "channel")?.parse()?,
                granted: verb == "grant",
            }
        },
        "relay" => {
            let (channel_id, rest) = split_word(rest);
            let (author, message) = split_word(rest);
            Command::Relay {
                channel_id: required(channel_id, "channel id")?.to_string(),
                author: required(author, "author")?.to_string(),
                message: required(message, "message")?.to_string(),
            }
        },
        "profile" => Command::Profile {
            name: required(rest, "name")?.to_string(),
        },
        "who" => Command::Who,
        "flush" => Command::Flush,
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "stop" => Command::Quit,
        other => bail!("unknown command {other:?}, try `help`"),
    };
    Ok(command)
}

fn execute(
    chat: &mut StaffChat,
    host: &ConsoleHost,
    command: Command,
    config_path: Option<&Path>,
) -> Result<()> {
    match command {
        Command::Join { name, staff, team } => {
            let participant = host.join(&name, staff, team);
            println!("{} joined", participant.name);
            chat.on_participant_join(&participant);
        },
        Command::Leave { name } => {
            let participant = host.leave(&name)?;
            println!("{} left", participant.name);
        },
        Command::Say { name, message } => {
            let sender = host.online_member(&name)?;
            if let Some(message) = chat.handle_chat(sender.clone(), &message) {
                host.resend_chat(&sender, &message);
            }
        },
        Command::Console { channel, message } => {
            chat.submit_message(channel, MessageSource::Console, &message);
        },
        Command::Toggle {
            name,
            channel,
            axis,
            enabled,
            quiet,
        } => {
            let participant = host.member(&name)?;
            if !chat.set_toggle(participant.id, channel, axis, enabled, quiet) {
                println!("{axis} change for {} on {channel} was rejected", participant.name);
            }
        },
        Command::Access {
            name,
            channel,
            granted,
        } => {
            let participant = host.set_access(&name, channel, granted)?;
            chat.reconcile_membership(participant.id);
        },
        Command::Relay {
            channel_id,
            author,
            message,
        } => {
            let inbound = InboundRelayMessage {
                channel_id,
                author: RelayAuthor {
                    name: author,
                    is_bot: false,
                },
                content: message,
            };
            if !chat.handle_relay_message(&inbound) {
                println!("relay message ignored");
            }
        },
        Command::Profile { name } => {
            let participant = host.member(&name)?;
            match chat.find_profile(participant.id) {
                Some(profile) => {
                    println!("{} ({})", participant.name, profile.id());
                    for channel in Channel::ALL {
                        println!("  {channel}: {}", describe(profile.toggles(channel)));
                    }
                },
                None => println!("{} has no profile", participant.name),
            }
        },
        Command::Who => host.print_who(),
        Command::Flush => {
            if chat.flush() {
                println!("profiles saved");
            } else {
                println!("nothing to save");
            }
        },
        Command::Reload => {
            chat.reload(crate::load_config(config_path)?);
            println!("config reloaded");
        },
        Command::Help => print!("{HELP}"),
        Command::Quit => {},
    }
    Ok(())
}

// ── Session ─────────────────────────────────────────────────────────────────

fn relay_for(config: &StaffChatConfig) -> Arc<dyn RelayTransport> {
    if !config.relay.enabled {
        return Arc::new(NoopRelay);
    }
    match WebhookRelay::from_config(config) {
        Ok(relay) => Arc::new(relay),
        Err(e) => {
            warn!(error = %e, "relay disabled");
            Arc::new(NoopRelay)
        },
    }
}

/// Run a console session until `quit`, end of input or ctrl-c.
pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config = crate::load_config(config_path.as_deref())?;
    for diagnostic in staffchat_config::check_config(&config) {
        warn!(
            path = %diagnostic.path,
            message = %diagnostic.message,
            "config problem"
        );
    }

    let store = Arc::new(FileStore::in_dir(&staffchat_config::data_dir(&config)));
    info!(path = %store.path().display(), "profile data file");

    let host = Arc::new(ConsoleHost::default());
    let relay = relay_for(&config);
    let mut chat = StaffChat::new(
        config,
        host.host(relay),
        Arc::clone(&store) as Arc<dyn ProfileStore>,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(1000 / TICKS_PER_SECOND));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    println!("type `help` for commands");

    loop {
        tokio::select! {
            _ = ticker.tick() => chat.tick(),
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(&mut chat, &host, command, config_path.as_deref()) {
                            println!("error: {e}");
                        }
                    },
                    Err(e) => println!("error: {e}"),
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    chat.shutdown();
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("join Alice staff team", Command::Join { name: "Alice".into(), staff: true, team: true })]
    #[case("/join Bob", Command::Join { name: "Bob".into(), staff: false, team: false })]
    #[case("say Alice  hello there ", Command::Say { name: "Alice".into(), message: "hello there".into() })]
    #[case("team restart in 5", Command::Console { channel: Channel::Team, message: "restart in 5".into() })]
    #[case("revoke Alice staff", Command::Access { name: "Alice".into(), channel: Channel::Staff, granted: false })]
    #[case("relay 123 Erin hi all", Command::Relay { channel_id: "123".into(), author: "Erin".into(), message: "hi all".into() })]
    #[case("EXIT", Command::Quit)]
    fn parses_commands(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(parse_command(line).unwrap(), expected);
    }

    #[test]
    fn parses_toggle_with_quiet() {
        assert_eq!(
            parse_command("toggle Alice staff auto on quiet").unwrap(),
            Command::Toggle {
                name: "Alice".into(),
                channel: Channel::Staff,
                axis: ToggleAxis::AutoRelay,
                enabled: true,
                quiet: true,
            }
        );
    }

    #[rstest]
    #[case("toggle Alice staff auto")]
    #[case("toggle Alice staff auto maybe")]
    #[case("toggle Alice global auto on")]
    #[case("say Alice")]
    #[case("join Alice admins")]
    #[case("dance")]
    fn rejects_bad_input(#[case] line: &str) {
        assert!(parse_command(line).is_err());
    }

    #[test]
    fn ids_follow_names_case_insensitively() {
        assert_eq!(participant_id("Alice"), participant_id("alice"));
        assert_ne!(participant_id("Alice"), participant_id("Bob"));
    }

    #[test]
    fn host_tracks_access_and_presence() {
        let host = ConsoleHost::default();
        let alice = host.join("Alice", true, false);
        assert!(host.has_staff_access(alice.id));
        assert!(!host.has_team_access(alice.id));

        host.set_access("alice", Channel::Team, true).unwrap();
        assert!(host.has_team_access(alice.id));

        host.leave("Alice").unwrap();
        assert!(host.online().is_empty());
        assert!(host.online_member("Alice").is_err());
        assert!(host.member("Alice").is_ok());
        assert!(host.member("Carol").is_err());
    }
}
