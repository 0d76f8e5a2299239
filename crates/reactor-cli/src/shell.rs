//! Interactive menu
//!
//! A blocking read-eval loop over any line source and sink, so the same
//! code drives the terminal and the tests. Closing the input ends the loop
//! the same way as choosing Exit.

use crate::error::Result;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use colored::{ColoredString, Colorize};
use reactor_common::types::{DISPLAY_DATE_FORMAT, REPORT_DATE_FORMAT};
use reactor_common::PowerStatus;
use reactor_ingest::{IngestOutcome, IngestPipeline, ReactorDetail, ReactorQueries};
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::{debug, warn};

const PROMPT: &str = ">>> ";
const BANNER_WIDTH: usize = 40;
const OUTAGE_SEPARATOR: &str = "           Number of days down: ";

/// Top-level menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ListUnits,
    ReactorDetail,
    OutagesByRange,
    Refresh,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::ListUnits),
            "2" => Some(Self::ReactorDetail),
            "3" => Some(Self::OutagesByRange),
            "4" => Some(Self::Refresh),
            "5" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Answer to "Confirm Date of ...: y or n"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirmation {
    Yes,
    No,
    Abandon,
}

/// Interactive shell over the ingest pipeline and the query service
pub struct Shell<R, W> {
    pipeline: IngestPipeline,
    queries: ReactorQueries,
    input: R,
    output: W,
    clock: Option<NaiveDateTime>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(pipeline: IngestPipeline, queries: ReactorQueries, input: R, output: W) -> Self {
        Self {
            pipeline,
            queries,
            input,
            output,
            clock: None,
        }
    }

    /// Pin "now" for status lookups instead of reading the local clock
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.clock = Some(now);
        self
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.unwrap_or_else(|| Local::now().naive_local())
    }

    /// Show the menu until the operator exits or input ends.
    ///
    /// Returns an error only for failures that must stop the program.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;

            let Some(line) = self.read_line()? else {
                debug!("Input closed, leaving menu");
                return Ok(());
            };

            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.output, "\n{}\n", "Please input a correct value.".yellow())?;
                continue;
            };

            debug!(?choice, "Menu selection");

            let result = match choice {
                MenuChoice::ListUnits => self.list_units().await,
                MenuChoice::ReactorDetail => self.reactor_detail().await,
                MenuChoice::OutagesByRange => self.outages_by_range().await,
                MenuChoice::Refresh => self.refresh().await,
                MenuChoice::Exit => return Ok(()),
            };

            match result {
                Ok(()) => {},
                Err(e) if !e.is_fatal() => {
                    warn!(error = %e, "Menu action failed");
                    writeln!(self.output, "\n{}\n", format!("Error: {e}").red())?;
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// Run one ingest cycle and report the outcome.
    ///
    /// Fetch and header failures are returned; a failed insert is reported
    /// and swallowed.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.pipeline.run().await {
            Ok(IngestOutcome::Loaded(stats)) => {
                writeln!(
                    self.output,
                    "\n{}\n{} rows loaded, {} rows skipped.\n",
                    "Data updated successfully!".green(),
                    stats.inserted,
                    stats.skipped
                )?;
            },
            Ok(IngestOutcome::NoValidRows(_)) => {
                writeln!(self.output, "\n{}\n", "No valid rows to insert.".yellow())?;
            },
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Data update failed");
                writeln!(self.output, "{}", format!("Error during data update: {e}").red())?;
            },
        }

        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output, "\nWelcome to the program:")?;
        writeln!(self.output, "1) List all of the Reactors")?;
        writeln!(self.output, "2) Retrieve Reactor Information")?;
        writeln!(self.output, "3) List outage reactors by date range")?;
        writeln!(self.output, "4) Re-Retrieve Data")?;
        writeln!(self.output, "5) Exit")?;
        write!(self.output, "{PROMPT}")?;
        Ok(())
    }

    async fn list_units(&mut self) -> Result<()> {
        let units = self.queries.list_units().await?;

        if units.is_empty() {
            writeln!(self.output, "\nNo reactors found.\n")?;
        } else {
            writeln!(self.output, "\n{}\n", units.join("\n"))?;
        }

        Ok(())
    }

    async fn reactor_detail(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "\nEnter the name of the reactor for which you need information (Press Enter to Return):"
        )?;

        let Some(line) = self.prompt(PROMPT)? else {
            return Ok(());
        };
        let unit = line.trim();
        if unit.is_empty() {
            return Ok(());
        }

        let now = self.now();
        let Some(detail) = self.queries.reactor_detail(unit, now).await? else {
            writeln!(self.output, "\nNo records found for reactor '{unit}'.\n")?;
            return Ok(());
        };

        self.print_detail(&detail, now)?;
        self.prompt("\nPress Enter to continue...")?;

        Ok(())
    }

    fn print_detail(&mut self, detail: &ReactorDetail, now: NaiveDateTime) -> Result<()> {
        let banner = "*".repeat(BANNER_WIDTH);

        writeln!(self.output, "\n{banner}")?;
        writeln!(self.output, "*** {} ***\n", detail.unit.bold())?;

        match &detail.latest {
            Some(latest) => {
                let as_of = latest.report_dt.format(REPORT_DATE_FORMAT);
                match detail.status() {
                    Some(status) => {
                        writeln!(
                            self.output,
                            "This reactor is {} as of {as_of}\n",
                            status_label(status)
                        )?;
                    },
                    None => {
                        writeln!(
                            self.output,
                            "This reactor reported an unrecognized power level as of {as_of}\n"
                        )?;
                    },
                }
                writeln!(self.output, "Reactor power level: {}", latest.power)?;
            },
            None => {
                writeln!(
                    self.output,
                    "No status reported on or before {}\n",
                    now.format(REPORT_DATE_FORMAT)
                )?;
            },
        }

        let last_down = detail.last_outage.map_or_else(
            || "never".to_string(),
            |dt| dt.format(REPORT_DATE_FORMAT).to_string(),
        );

        writeln!(
            self.output,
            "Days reactor was down in the last 365 days: {}",
            detail.outage_count
        )?;
        writeln!(self.output, "Last date the reactor was down: {last_down}")?;
        writeln!(self.output, "{banner}")?;

        Ok(())
    }

    async fn outages_by_range(&mut self) -> Result<()> {
        let Some((min_year, max_year)) = self.queries.year_bounds().await? else {
            writeln!(self.output, "\nNo data available\n")?;
            return Ok(());
        };
        let Some((min, max)) = self.queries.available_dates().await? else {
            writeln!(self.output, "\nNo data available\n")?;
            return Ok(());
        };
        let years = min_year..=max_year;
        let max_display = max.format(DISPLAY_DATE_FORMAT);

        let prompt = format!(
            "Enter the start date between {} and {max_display}",
            min.format(DISPLAY_DATE_FORMAT)
        );
        let Some(start) = self.input_date(&prompt, years.clone())? else {
            return Ok(());
        };

        let prompt = format!(
            "Enter the end date between {} and {max_display}",
            start.format(DISPLAY_DATE_FORMAT)
        );
        let Some(end) = self.input_date(&prompt, years)? else {
            return Ok(());
        };

        let outages = self.queries.outages_between(start, end).await?;
        let banner = "*".repeat(BANNER_WIDTH);

        writeln!(self.output, "\n{banner}")?;
        writeln!(
            self.output,
            "\nReactors that are down between {} and {}:\n",
            start.format(DISPLAY_DATE_FORMAT),
            end.format(DISPLAY_DATE_FORMAT)
        )?;

        if outages.is_empty() {
            writeln!(self.output, "No reactors were down in that range.")?;
        }
        for outage in &outages {
            writeln!(self.output, "{}{OUTAGE_SEPARATOR}{}", outage.unit, outage.days_down)?;
        }

        writeln!(self.output, "\n{banner}")?;

        Ok(())
    }

    /// Collect a calendar date one component at a time.
    ///
    /// Empty input at any prompt abandons the whole entry. Answering "n" at
    /// the confirmation starts over.
    fn input_date(
        &mut self,
        prompt: &str,
        years: RangeInclusive<i32>,
    ) -> Result<Option<NaiveDate>> {
        loop {
            writeln!(self.output, "{prompt}")?;

            let Some(year) = self.read_number("Year: ", years.clone(), "year")? else {
                return Ok(None);
            };
            let Some(month) = self.read_number("Month (1 - 12): ", 1..=12, "month")? else {
                return Ok(None);
            };
            let days = days_in_month(year, month);
            let label = format!("Day (1 - {days}): ");
            let Some(day) = self.read_number(&label, 1..=days, "day")? else {
                return Ok(None);
            };

            match self.confirm_date(year, month, day)? {
                Confirmation::Yes => return Ok(NaiveDate::from_ymd_opt(year, month, day)),
                Confirmation::No => continue,
                Confirmation::Abandon => return Ok(None),
            }
        }
    }

    fn read_number<T>(
        &mut self,
        label: &str,
        range: RangeInclusive<T>,
        noun: &str,
    ) -> Result<Option<T>>
    where
        T: FromStr + PartialOrd + Display,
    {
        loop {
            let Some(line) = self.prompt(label)? else {
                return Ok(None);
            };
            let raw = line.trim();
            if raw.is_empty() {
                return Ok(None);
            }

            match raw.parse::<T>() {
                Ok(value) if range.contains(&value) => return Ok(Some(value)),
                Ok(_) => writeln!(
                    self.output,
                    "Please input a {noun} between {} and {}.",
                    range.start(),
                    range.end()
                )?,
                Err(_) => writeln!(self.output, "Please enter a valid {noun}.")?,
            }
        }
    }

    fn confirm_date(&mut self, year: i32, month: u32, day: u32) -> Result<Confirmation> {
        loop {
            writeln!(self.output, "Confirm Date of {month}/{day}/{year}: y or n")?;

            let Some(answer) = self.prompt(PROMPT)? else {
                return Ok(Confirmation::Abandon);
            };

            match answer.trim().to_lowercase().as_str() {
                "y" => return Ok(Confirmation::Yes),
                "n" => return Ok(Confirmation::No),
                "" => return Ok(Confirmation::Abandon),
                _ => writeln!(self.output, "Invalid input. Please enter 'y' or 'n'.")?,
            }
        }
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.read_line()
    }

    /// Next input line without its terminator, or `None` at end of input.
    /// Bytes that are not UTF-8 are replaced, so they read as invalid input.
    fn read_line(&mut self) -> Result<Option<String>> {
        self.output.flush()?;

        let mut bytes = Vec::new();
        if self.input.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(None);
        }

        let line = String::from_utf8_lossy(&bytes);
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}

fn status_label(status: PowerStatus) -> ColoredString {
    match status {
        PowerStatus::Down => status.as_str().red(),
        PowerStatus::LowPower => status.as_str().yellow(),
        PowerStatus::Running => status.as_str().green(),
    }
}

/// Number of days in `month` of `year`
fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}
