//! Puzzle catalogue: the five stages, their answer payloads, and the
//! predicates that decide whether an answer is correct.
//!
//! Every answer is a variant of [`Answer`], so the mission can validate
//! any submission through one uniform entry point. Text comparisons are
//! trimmed and ASCII case-insensitive.

use std::fmt;

// ══════════════════════════════════════════════════════════════
// Puzzle identity
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum PuzzleId {
    Cabling,
    Wifi,
    IpAddressing,
    Ping,
    Troubleshooting,
}

impl PuzzleId {
    /// All puzzles in play order.
    pub const ALL: [PuzzleId; 5] = [
        PuzzleId::Cabling,
        PuzzleId::Wifi,
        PuzzleId::IpAddressing,
        PuzzleId::Ping,
        PuzzleId::Troubleshooting,
    ];

    pub const FIRST: PuzzleId = PuzzleId::Cabling;

    /// 1-based stage number as shown to players.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// 0-based position, used to index per-puzzle tables.
    pub fn index(self) -> usize {
        match self {
            PuzzleId::Cabling => 0,
            PuzzleId::Wifi => 1,
            PuzzleId::IpAddressing => 2,
            PuzzleId::Ping => 3,
            PuzzleId::Troubleshooting => 4,
        }
    }

    /// The stage that follows this one, or `None` after the last.
    pub fn next(self) -> Option<PuzzleId> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    pub fn title(self) -> &'static str {
        match self {
            PuzzleId::Cabling => "Physical connection",
            PuzzleId::Wifi => "Wi-Fi connection",
            PuzzleId::IpAddressing => "IP addressing",
            PuzzleId::Ping => "Connectivity test",
            PuzzleId::Troubleshooting => "Troubleshooting flowchart",
        }
    }

    /// Skill assessed by this stage, printed in the report.
    pub fn skill(self) -> &'static str {
        match self {
            PuzzleId::Cabling => "Identify a hardware fault",
            PuzzleId::Wifi => "Choose a connection solution",
            PuzzleId::IpAddressing => "Configure a network (IP addressing)",
            PuzzleId::Ping => "Test a network communication",
            PuzzleId::Troubleshooting => "Apply a troubleshooting method",
        }
    }
}

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "puzzle {}", self.number())
    }
}

// ══════════════════════════════════════════════════════════════
// Expected answers
// ══════════════════════════════════════════════════════════════

pub const CABLE_PASSWORD: &str = "CONNEXION";
pub const WIFI_PASSWORD: &str = "SIGNAL";
pub const PC3_ADDRESS: &str = "192.168.1.12";
pub const PC4_ADDRESS: &str = "192.168.1.13";
pub const PING_COMMAND: &str = "ping 192.168.1.12";

/// Agent name used in the ping prompt when nobody was named.
pub const DEFAULT_LEAD_AGENT: &str = "agent1";

// ── Wi-Fi networks ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Network {
    Unknown,
    SecureAgent,
    FreeHackers,
}

impl Network {
    /// Networks in the order the selector lists them.
    pub const ALL: [Network; 3] = [Network::Unknown, Network::SecureAgent, Network::FreeHackers];

    pub fn label(self) -> &'static str {
        match self {
            Network::Unknown => "Unknown network",
            Network::SecureAgent => "Secure agent network",
            Network::FreeHackers => "Free hackers",
        }
    }

    pub fn is_secure(self) -> bool {
        self == Network::SecureAgent
    }
}

// ── Troubleshooting flowchart ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FlowStep {
    PowerOn,
    WiredLink,
    WifiLink,
    Routing,
    ServerReachable,
}

impl FlowStep {
    /// Correct slot contents, top to bottom.
    pub const SOLUTION: [FlowStep; 5] = [
        FlowStep::PowerOn,
        FlowStep::WiredLink,
        FlowStep::WifiLink,
        FlowStep::Routing,
        FlowStep::ServerReachable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FlowStep::PowerOn => "Power on every network device",
            FlowStep::WiredLink => "Is the terminal on a wired connection?",
            FlowStep::WifiLink => "Check the Wi-Fi connection to the network",
            FlowStep::Routing => "Check the terminal routing (IP address, subnet mask)",
            FlowStep::ServerReachable => "Does the terminal (PC) reach the server?",
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Answers
// ══════════════════════════════════════════════════════════════

/// Per-run context some predicates depend on.
#[derive(Clone, Debug)]
pub struct PuzzleContext {
    pub lead_agent: String,
}

impl PuzzleContext {
    pub fn new(lead_agent: impl Into<String>) -> Self {
        PuzzleContext { lead_agent: lead_agent.into() }
    }

    /// Command prompt prefilled in the ping puzzle.
    pub fn ping_prompt(&self) -> String {
        format!("C:\\agent\\{}>", self.lead_agent)
    }
}

impl Default for PuzzleContext {
    fn default() -> Self {
        PuzzleContext::new(DEFAULT_LEAD_AGENT)
    }
}

/// A submitted answer. The variant determines which puzzle it is for.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Answer {
    Cabling { cable_plugged: bool, password: String },
    Wifi { network: Option<Network>, password: String },
    IpAddressing { pc3: String, pc4: String },
    Ping { command: String },
    Troubleshooting { slots: [Option<FlowStep>; 5] },
}

impl Answer {
    pub fn puzzle(&self) -> PuzzleId {
        match self {
            Answer::Cabling { .. } => PuzzleId::Cabling,
            Answer::Wifi { .. } => PuzzleId::Wifi,
            Answer::IpAddressing { .. } => PuzzleId::IpAddressing,
            Answer::Ping { .. } => PuzzleId::Ping,
            Answer::Troubleshooting { .. } => PuzzleId::Troubleshooting,
        }
    }

    pub fn is_correct(&self, ctx: &PuzzleContext) -> bool {
        match self {
            Answer::Cabling { cable_plugged, password } => {
                *cable_plugged && text_matches(password, CABLE_PASSWORD)
            }
            Answer::Wifi { network, password } => {
                network.is_some_and(Network::is_secure) && text_matches(password, WIFI_PASSWORD)
            }
            Answer::IpAddressing { pc3, pc4 } => {
                text_matches(pc3, PC3_ADDRESS) && text_matches(pc4, PC4_ADDRESS)
            }
            Answer::Ping { command } => ping_matches(command, &ctx.ping_prompt()),
            Answer::Troubleshooting { slots } => slots
                .iter()
                .zip(FlowStep::SOLUTION.iter())
                .all(|(slot, expected)| *slot == Some(*expected)),
        }
    }
}

/// Case-insensitive for any script, not only ASCII: agent names may carry
/// accents.
fn text_matches(input: &str, expected: &str) -> bool {
    input.trim().to_lowercase() == expected.to_lowercase()
}

/// The command must keep the prompt and follow it with the ping target.
fn ping_matches(command: &str, prompt: &str) -> bool {
    let full = command.trim().to_lowercase();
    full.strip_prefix(&prompt.to_lowercase())
        .is_some_and(|rest| text_matches(rest, PING_COMMAND))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PuzzleContext {
        PuzzleContext::new("Alice")
    }

    // ── ordering ──

    #[test]
    fn puzzles_run_in_fixed_order() {
        assert_eq!(PuzzleId::Cabling.next(), Some(PuzzleId::Wifi));
        assert_eq!(PuzzleId::Ping.next(), Some(PuzzleId::Troubleshooting));
        assert_eq!(PuzzleId::Troubleshooting.next(), None);
        assert!(PuzzleId::Troubleshooting.is_last());
    }

    // ── puzzle 1 ──

    #[test]
    fn cabling_needs_cable_and_password() {
        let ok = Answer::Cabling { cable_plugged: true, password: "  connexion ".into() };
        let unplugged = Answer::Cabling { cable_plugged: false, password: "CONNEXION".into() };
        let wrong = Answer::Cabling { cable_plugged: true, password: "CONNECTION".into() };
        assert!(ok.is_correct(&ctx()));
        assert!(!unplugged.is_correct(&ctx()));
        assert!(!wrong.is_correct(&ctx()));
    }

    // ── puzzle 2 ──

    #[test]
    fn wifi_needs_secure_network() {
        let ok = Answer::Wifi { network: Some(Network::SecureAgent), password: "Signal".into() };
        let hackers = Answer::Wifi { network: Some(Network::FreeHackers), password: "SIGNAL".into() };
        let none = Answer::Wifi { network: None, password: "SIGNAL".into() };
        assert!(ok.is_correct(&ctx()));
        assert!(!hackers.is_correct(&ctx()));
        assert!(!none.is_correct(&ctx()));
    }

    // ── puzzle 3 ──

    #[test]
    fn ip_addresses_are_trimmed() {
        let ok = Answer::IpAddressing { pc3: " 192.168.1.12".into(), pc4: "192.168.1.13 ".into() };
        let swapped = Answer::IpAddressing { pc3: "192.168.1.13".into(), pc4: "192.168.1.12".into() };
        assert!(ok.is_correct(&ctx()));
        assert!(!swapped.is_correct(&ctx()));
    }

    // ── puzzle 4 ──

    #[test]
    fn ping_prompt_uses_lead_agent() {
        assert_eq!(ctx().ping_prompt(), "C:\\agent\\Alice>");
        assert_eq!(PuzzleContext::default().ping_prompt(), "C:\\agent\\agent1>");
    }

    #[test]
    fn ping_accepts_command_after_prompt() {
        let ok = Answer::Ping { command: "C:\\agent\\Alice> PING 192.168.1.12 ".into() };
        let lower_prompt = Answer::Ping { command: "c:\\AGENT\\alice>ping 192.168.1.12".into() };
        assert!(ok.is_correct(&ctx()));
        assert!(lower_prompt.is_correct(&ctx()));
    }

    #[test]
    fn ping_folds_accented_names() {
        let zoe = PuzzleContext::new("Zoé");
        let shouted = Answer::Ping { command: "c:\\agent\\ZOÉ>ping 192.168.1.12".into() };
        assert!(shouted.is_correct(&zoe));
    }

    #[test]
    fn ping_rejects_missing_prompt_or_wrong_target() {
        let no_prompt = Answer::Ping { command: "ping 192.168.1.12".into() };
        let wrong_host = Answer::Ping { command: "C:\\agent\\Alice>ping 192.168.1.13".into() };
        let other_agent = Answer::Ping { command: "C:\\agent\\Bob>ping 192.168.1.12".into() };
        assert!(!no_prompt.is_correct(&ctx()));
        assert!(!wrong_host.is_correct(&ctx()));
        assert!(!other_agent.is_correct(&ctx()));
    }

    #[test]
    fn ping_handles_multibyte_input_without_panicking() {
        let odd = Answer::Ping { command: "éééééééééééééééé".into() };
        assert!(!odd.is_correct(&ctx()));
    }

    // ── puzzle 5 ──

    #[test]
    fn flowchart_requires_exact_order() {
        let ok = Answer::Troubleshooting { slots: FlowStep::SOLUTION.map(Some) };
        assert!(ok.is_correct(&ctx()));

        let mut swapped = FlowStep::SOLUTION.map(Some);
        swapped.swap(1, 2);
        assert!(!Answer::Troubleshooting { slots: swapped }.is_correct(&ctx()));

        let mut gap = FlowStep::SOLUTION.map(Some);
        gap[4] = None;
        assert!(!Answer::Troubleshooting { slots: gap }.is_correct(&ctx()));
    }

    #[test]
    fn answer_reports_its_puzzle() {
        let a = Answer::Ping { command: String::new() };
        assert_eq!(a.puzzle(), PuzzleId::Ping);
    }
}
