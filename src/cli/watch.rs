//! Interactive converter session.
//!
//! The session owns the engine. Rate requests run on spawned tasks and their
//! results, timer ticks and user input are all handled on the session task, so
//! engine state never needs a lock.

use super::{currencies, ui};
use crate::core::{
    ConversionEngine, CurrencySelector, RateError, RateTable, RefreshOutcome, RefreshTicket,
    RefreshTimer,
};
use anyhow::{Result, anyhow};
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

const HELP: &str = "\
Commands:
  amount <value>   set the amount to convert
  from <CODE>      set the source currency
  to <CODE>        set the target currency
  swap             swap source and target
  refresh          fetch the latest rates now
  show             redraw the converter
  currencies       list supported currencies
  help             show this help
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Amount(String),
    From(String),
    To(String),
    Swap,
    Refresh,
    Show,
    Currencies,
    Help,
    Quit,
}

impl FromStr for WatchCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "amount" | "a" => Ok(WatchCommand::Amount(arg.to_string())),
            "from" => Ok(WatchCommand::From(arg.to_string())),
            "to" => Ok(WatchCommand::To(arg.to_string())),
            "swap" | "s" => Ok(WatchCommand::Swap),
            "refresh" | "r" => Ok(WatchCommand::Refresh),
            "show" | "" => Ok(WatchCommand::Show),
            "currencies" => Ok(WatchCommand::Currencies),
            "help" | "?" => Ok(WatchCommand::Help),
            "quit" | "exit" | "q" => Ok(WatchCommand::Quit),
            _ => Err(anyhow!("Unknown command: {}", verb)),
        }
    }
}

type FetchResult = (RefreshTicket, Result<RateTable, RateError>);

pub struct WatchSession {
    engine: ConversionEngine,
    in_flight: JoinSet<FetchResult>,
    period: Duration,
    tick_tx: mpsc::UnboundedSender<()>,
    ticks: mpsc::UnboundedReceiver<()>,
    timer: RefreshTimer,
}

fn start_timer(period: Duration, tick_tx: mpsc::UnboundedSender<()>) -> RefreshTimer {
    RefreshTimer::start(period, move || {
        if tick_tx.send(()).is_err() {
            debug!("Session gone, dropping timer tick");
        }
    })
}

impl WatchSession {
    /// Starts the refresh timer and issues the first rate request.
    pub fn start(engine: ConversionEngine, period: Duration) -> Self {
        let (tick_tx, ticks) = mpsc::unbounded_channel();
        let timer = start_timer(period, tick_tx.clone());

        let mut session = Self {
            engine,
            in_flight: JoinSet::new(),
            period,
            tick_tx,
            ticks,
            timer,
        };
        let ticket = session.engine.begin_refresh();
        session.dispatch(ticket);
        session
    }

    pub fn engine(&self) -> &ConversionEngine {
        &self.engine
    }

    fn dispatch(&mut self, ticket: RefreshTicket) {
        let provider = self.engine.provider();
        self.in_flight.spawn(async move {
            let result = provider.latest(ticket.pair.source).await;
            (ticket, result)
        });
    }

    /// Fetches rates for a new selection. The timer restarts so the next
    /// background refresh is one full period after this one.
    fn dispatch_selection(&mut self, ticket: Option<RefreshTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        self.dispatch(ticket);

        self.timer = start_timer(self.period, self.tick_tx.clone());
        // A tick from the replaced timer may already be queued
        while self.ticks.try_recv().is_ok() {}
        debug!(pair = %self.engine.pair(), "Refresh timer restarted");
    }

    /// Processes input until `quit` or end of input, then stops the timer and
    /// cancels outstanding requests.
    pub async fn run<R, W>(mut self, input: R, mut out: W) -> Result<ConversionEngine>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.render(&mut out)?;
        let mut lines = input.lines();

        loop {
            tokio::select! {
                Some(joined) = self.in_flight.join_next() => {
                    match joined {
                        Ok((ticket, result)) => {
                            let outcome = self.engine.complete_refresh(ticket, result);
                            if outcome != RefreshOutcome::Superseded {
                                self.render(&mut out)?;
                            }
                        }
                        Err(e) => warn!("Rate request task failed: {e}"),
                    }
                }
                Some(()) = self.ticks.recv() => {
                    let ticket = self.engine.begin_refresh();
                    self.dispatch(ticket);
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Input closed");
                        break;
                    };
                    if !self.handle_line(&line, &mut out)? {
                        break;
                    }
                }
            }
        }

        self.timer.stop();
        self.in_flight.abort_all();
        Ok(self.engine)
    }

    /// Applies one line of input. Returns `false` when the session should end.
    fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool> {
        let command = match line.parse::<WatchCommand>() {
            Ok(command) => command,
            Err(e) => {
                let message = format!("{e} (type 'help')");
                writeln!(out, "{}", ui::style_text(&message, ui::StyleType::Error))?;
                return Ok(true);
            }
        };
        debug!(?command, "Handling command");

        match command {
            WatchCommand::Amount(text) => self.engine.set_amount(&text),
            WatchCommand::From(raw) => {
                let selector = CurrencySelector::new(self.engine.pair().source);
                match selector.pick(&raw) {
                    Some(code) => {
                        let ticket = self.engine.select_source(code);
                        self.dispatch_selection(ticket);
                    }
                    None => return self.reject_currency(&raw, out),
                }
            }
            WatchCommand::To(raw) => {
                let selector = CurrencySelector::new(self.engine.pair().target);
                match selector.pick(&raw) {
                    Some(code) => {
                        let ticket = self.engine.select_target(code);
                        self.dispatch_selection(ticket);
                    }
                    None => return self.reject_currency(&raw, out),
                }
            }
            WatchCommand::Swap => {
                let ticket = self.engine.select_swap();
                self.dispatch_selection(ticket);
            }
            WatchCommand::Refresh => {
                if self.engine.is_loading() {
                    let message = ui::style_text("Refresh already in progress", ui::StyleType::Subtle);
                    writeln!(out, "{message}")?;
                    return Ok(true);
                }
                let ticket = self.engine.begin_refresh();
                self.dispatch(ticket);
            }
            WatchCommand::Show => {}
            WatchCommand::Currencies => {
                writeln!(out, "{}", currencies::currencies_table(self.engine.pair()))?;
                return Ok(true);
            }
            WatchCommand::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(true);
            }
            WatchCommand::Quit => return Ok(false),
        }

        self.render(out)?;
        Ok(true)
    }

    fn reject_currency<W: Write>(&self, raw: &str, out: &mut W) -> Result<bool> {
        let message = format!("Unsupported currency: {raw}");
        writeln!(out, "{}", ui::style_text(&message, ui::StyleType::Error))?;
        Ok(true)
    }

    fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "\n{}", ui::render_panel(&self.engine.view()))?;
        out.flush()?;
        Ok(())
    }
}

/// Runs an interactive session on stdin/stdout.
pub async fn run(engine: ConversionEngine, period: Duration) -> Result<()> {
    println!("{HELP}");
    ui::print_separator();

    let session = WatchSession::start(engine, period);
    let stdin = BufReader::new(tokio::io::stdin());
    session.run(stdin, std::io::stdout()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CurrencyCode, CurrencyPair, RateProvider};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::AsyncWriteExt;

    /// Answers every base with a fixed table and counts requests.
    struct FixedProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateProvider for FixedProvider {
        async fn latest(&self, base: CurrencyCode) -> Result<RateTable, RateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let rates = match base {
                CurrencyCode::Ksh => HashMap::from([("USD".to_string(), 0.0077)]),
                CurrencyCode::Usd => {
                    HashMap::from([("KSH".to_string(), 130.0), ("EUR".to_string(), 0.9)])
                }
                _ => HashMap::new(),
            };
            Ok(RateTable { base, rates })
        }
    }

    fn start_session() -> (WatchSession, Arc<FixedProvider>) {
        let provider = Arc::new(FixedProvider {
            calls: AtomicUsize::new(0),
        });
        let engine = ConversionEngine::new(
            provider.clone(),
            CurrencyPair::new(CurrencyCode::Ksh, CurrencyCode::Usd),
            "10000",
        );
        (WatchSession::start(engine, Duration::from_secs(30)), provider)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "amount 12.5".parse::<WatchCommand>().unwrap(),
            WatchCommand::Amount("12.5".to_string())
        );
        assert_eq!(
            "amount".parse::<WatchCommand>().unwrap(),
            WatchCommand::Amount(String::new())
        );
        assert_eq!(
            "  FROM eur ".parse::<WatchCommand>().unwrap(),
            WatchCommand::From("eur".to_string())
        );
        assert_eq!(
            "to USD".parse::<WatchCommand>().unwrap(),
            WatchCommand::To("USD".to_string())
        );
        assert_eq!("swap".parse::<WatchCommand>().unwrap(), WatchCommand::Swap);
        assert_eq!("r".parse::<WatchCommand>().unwrap(), WatchCommand::Refresh);
        assert_eq!("".parse::<WatchCommand>().unwrap(), WatchCommand::Show);
        assert_eq!("q".parse::<WatchCommand>().unwrap(), WatchCommand::Quit);
        assert!("convert 5".parse::<WatchCommand>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_applies_commands() {
        let (session, provider) = start_session();
        let (mut client, server) = tokio::io::duplex(1024);
        let handle = tokio::spawn(session.run(BufReader::new(server), std::io::sink()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        client.write_all(b"amount 5\nfrom BTC\nswap\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        client.write_all(b"quit\n").await.unwrap();

        let engine = handle.await.unwrap().unwrap();
        assert_eq!(
            engine.pair(),
            CurrencyPair::new(CurrencyCode::Usd, CurrencyCode::Ksh)
        );
        assert_eq!(engine.amount_text(), "5");
        assert_eq!(engine.converted_amount(), Some(650.0));
        // Initial request plus the swap; the rejected selection never fetched
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_refreshes_until_session_ends() {
        let (session, provider) = start_session();
        let (mut client, server) = tokio::io::duplex(1024);
        let handle = tokio::spawn(session.run(BufReader::new(server), std::io::sink()));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);

        client.write_all(b"quit\n").await.unwrap();
        let engine = handle.await.unwrap().unwrap();
        assert!(engine.converted_amount().is_some());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pair_change_restarts_timer() {
        let (session, provider) = start_session();
        let (mut client, server) = tokio::io::duplex(1024);
        let handle = tokio::spawn(session.run(BufReader::new(server), std::io::sink()));

        tokio::time::sleep(Duration::from_secs(29)).await;
        client.write_all(b"to EUR\n").await.unwrap();

        // The tick due at 30s was pushed back to 59s
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);

        // Re-selecting the current target changes nothing, timer included
        client.write_all(b"to EUR\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);

        client.write_all(b"quit\n").await.unwrap();
        let engine = handle.await.unwrap().unwrap();
        assert_eq!(engine.pair().target, CurrencyCode::Eur);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_input_ends_session() {
        let (session, provider) = start_session();
        let engine = session
            .run(BufReader::new(&b""[..]), std::io::sink())
            .await
            .unwrap();

        assert_eq!(engine.pair().source, CurrencyCode::Ksh);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(provider.calls.load(Ordering::SeqCst) <= 1);
    }
}
