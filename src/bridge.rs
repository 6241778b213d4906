//! Client for the external drop-decision service.
//!
//! The service is optional: when `--gen_server` is given, the heuristic
//! generalizer outsources its should-try-drop verdicts to it and feeds it
//! the transforms it applies. The wire protocol is newline-delimited
//! s-expressions over TCP:
//!
//! - `(greet "<name>")` answered by `(greeting "<message>")`, a liveness
//!   probe sent when the client attaches,
//! - `(lemma :before "<text>" :after "<text>")` answered by `(ack)`,
//!   telemetry for an applied generalization,
//! - `(query :lemma "<text>" :kept (<uid>*) :checking <uid>
//!   :candidates (<uid>*))` answered by `(answer <int>)`, where a strictly
//!   positive integer means "try the drop". Uids are the hash-consing uids
//!   of the literals.
//!
//! All operations carry timeouts. Callers degrade to their local policy on
//! any error here, the service is advisory and must never stall a
//! generalization run.

use std::io::{BufRead, BufReader};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::common::*;

/// Connect, read and write timeout.
const TIMEOUT: Duration = Duration::from_secs(3);

/// Connection to the decision service.
pub struct DecisionClient {
    /// Read side, line-buffered.
    reader: BufReader<TcpStream>,
    /// Write side.
    writer: TcpStream,
}

impl DecisionClient {
    /// Connects to the service.
    pub fn connect(addr: &str) -> Res<Self> {
        let addr = addr
            .to_socket_addrs()
            .chain_err(|| format!("could not resolve decision service address `{}`", addr))?
            .next()
            .ok_or_else(|| {
                Error::from(ErrorKind::Protocol(format!(
                    "decision service address `{}` resolves to nothing",
                    addr
                )))
            })?;
        let stream = TcpStream::connect_timeout(&addr, TIMEOUT)
            .chain_err(|| format!("while connecting to decision service at {}", addr))?;
        stream.set_read_timeout(Some(TIMEOUT))?;
        stream.set_write_timeout(Some(TIMEOUT))?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(DecisionClient {
            reader,
            writer: stream,
        })
    }

    /// Liveness probe.
    pub fn greet(&mut self, name: &str) -> Res<String> {
        writeln!(self.writer, "(greet \"{}\")", escape(name))?;
        self.writer.flush()?;
        let line = self.read_line()?;
        let msg = unwrap_sexpr(&line, "greeting")?;
        unquote(msg)
    }

    /// Reports an applied generalization.
    pub fn send_lemma(&mut self, before: &str, after: &str) -> Res<()> {
        writeln!(
            self.writer,
            "(lemma :before \"{}\" :after \"{}\")",
            escape(before),
            escape(after)
        )?;
        self.writer.flush()?;
        let line = self.read_line()?;
        if line.trim() != "(ack)" {
            bail!(ErrorKind::Protocol(format!(
                "expected `(ack)`, got `{}`",
                line.trim()
            )))
        }
        Ok(())
    }

    /// Asks whether dropping a literal is worth attempting.
    ///
    /// `kept` are the uids of the literals confirmed so far, `candidates`
    /// the uids of the ones not visited yet. True iff the service's answer
    /// is strictly positive.
    pub fn query_model(
        &mut self,
        lemma: &str,
        kept: &[u64],
        checking: u64,
        candidates: &[u64],
    ) -> Res<bool> {
        writeln!(
            self.writer,
            "(query :lemma \"{}\" :kept ({}) :checking {} :candidates ({}))",
            escape(lemma),
            uids(kept),
            checking,
            uids(candidates)
        )?;
        self.writer.flush()?;
        let line = self.read_line()?;
        let answer = unwrap_sexpr(&line, "answer")?;
        let answer = answer.trim().parse::<i64>().chain_err(|| {
            ErrorKind::Protocol(format!("expected an integer answer, got `{}`", answer))
        })?;
        Ok(answer > 0)
    }

    /// Reads one response line.
    fn read_line(&mut self) -> Res<String> {
        let mut line = String::new();
        let count = self.reader.read_line(&mut line)?;
        if count == 0 {
            bail!(ErrorKind::Protocol(
                "decision service closed the connection".into()
            ))
        }
        Ok(line)
    }
}

/// Space-separated uid list.
fn uids(uids: &[u64]) -> String {
    let mut buf = String::new();
    for (idx, uid) in uids.iter().enumerate() {
        if idx > 0 {
            buf.push(' ')
        }
        buf.push_str(&uid.to_string())
    }
    buf
}

/// Escapes a string for inclusion between double quotes.
fn escape(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '"' => {
                buf.push('\\');
                buf.push(c)
            }
            '\n' => buf.push_str("\\n"),
            _ => buf.push(c),
        }
    }
    buf
}

/// Strips `(<head> ... )` from a response line, yields the inside.
fn unwrap_sexpr<'a>(line: &'a str, head: &str) -> Res<&'a str> {
    line.trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .and_then(|s| s.trim().strip_prefix(head))
        .map(|s| s.trim())
        .ok_or_else(|| {
            Error::from(ErrorKind::Protocol(format!(
                "expected `({} ...)`, got `{}`",
                head,
                line.trim()
            )))
        })
}

/// Strips surrounding double quotes and unescapes the content.
fn unquote(s: &str) -> Res<String> {
    let inner = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| {
            Error::from(ErrorKind::Protocol(format!(
                "expected a quoted string, got `{}`",
                s
            )))
        })?;
    let mut buf = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            match c {
                'n' => buf.push('\n'),
                _ => buf.push(c),
            }
            escaped = false
        } else if c == '\\' {
            escaped = true
        } else {
            buf.push(c)
        }
    }
    Ok(buf)
}
