use libc::pid_t;
use log::trace;
use regex::Regex;
use super::{Connection, Protocol, Status};

/// Lines with fewer whitespace separated fields than this are dropped.
pub const MIN_FIELDS: usize = 8;

/// Converts the connection listing (`lsof -i` format: a header followed by
/// `COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME` rows) into
/// connections without process or project context.
pub struct Parser {
    port: Regex,
}

impl Parser {
    pub fn new() -> Self {
        // the local endpoint's port is the digit run after a ':' that ends
        // the token or is followed by the remote side
        let port = r":(\d+)(?:->|$)";
        Self {
            port: Regex::new(port).expect("valid port pattern"),
        }
    }

    pub fn parse(&self, text: &str) -> Vec<Connection> {
        text.lines().skip(1).filter(|line| {
            !line.trim().is_empty()
        }).filter_map(|line| {
            let conn = self.line(line);
            if conn.is_none() {
                trace!("skipped line '{}'", line);
            }
            conn
        }).collect()
    }

    pub fn line(&self, line: &str) -> Option<Connection> {
        let fields = line.split_whitespace().collect::<Vec<_>>();

        if fields.len() < MIN_FIELDS {
            return None;
        }

        let command = fields[0].to_owned();
        let pid     = fields[1].parse::<pid_t>().ok()?;
        let user    = fields[2].to_owned();

        let protocol = match line.contains("UDP") {
            true  => Protocol::UDP,
            false => Protocol::TCP,
        };

        let status = match line {
            _ if line.contains("(LISTEN)")      => Status::Listening,
            _ if line.contains("(ESTABLISHED)") => Status::Established,
            _                                   => Status::Other,
        };

        let port = self.port(address(&fields))?;

        Some(Connection {
            port:     port,
            pid:      pid,
            name:     command.clone(),
            command:  command,
            user:     user,
            protocol: protocol,
            status:   status,
            project:  None,
        })
    }

    fn port(&self, addr: &str) -> Option<u16> {
        let caps = self.port.captures(addr)?;
        caps.get(1)?.as_str().parse().ok()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// NAME is the last field unless lsof appended a parenthesized state.
fn address<'a>(fields: &[&'a str]) -> &'a str {
    let n = fields.len();
    match fields[n - 1] {
        last if last.starts_with('(') => fields[n - 2],
        last                          => last,
    }
}
