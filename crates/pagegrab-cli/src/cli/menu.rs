//! Numbered text menu with a navigation path.
//!
//! Every page redraws the whole screen: banner (optional), the path from the
//! main page (`- main > images`), the page body, then the last notice. `0`
//! goes back one page, or exits from the main page. End of input exits.

use anyhow::Result;
use pagegrab_core::extract::Page;
use pagegrab_core::harvest::{save_page_images, HarvestOptions};
use pagegrab_core::scribe::Severity;
use std::io::{BufRead, Write};

use crate::cli::commands::attribute_values;
use crate::cli::parse_attr_pair;
use crate::cli::progress::ProgressBar;
use crate::cli::session::Session;

const CLEAR: &str = "\x1b[2J\x1b[H";
const PROMPT: &str = "> ";
const BAR_WIDTH: usize = 30;

const BANNER: &str = r"
                                           _
  _ __   __ _  __ _  ___  __ _ _ __ __ _| |__
 | '_ \ / _` |/ _` |/ _ \/ _` | '__/ _` | '_ \
 | |_) | (_| | (_| |  __/ (_| | | | (_| | |_) |
 | .__/ \__,_|\__, |\___|\__, |_|  \__,_|_.__/
 |_|          |___/      |___/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPage {
    Main,
    Images,
    Attributes,
}

impl MenuPage {
    pub fn id(self) -> &'static str {
        match self {
            MenuPage::Main => "main",
            MenuPage::Images => "images",
            MenuPage::Attributes => "attributes",
        }
    }

    fn body(self) -> &'static str {
        match self {
            MenuPage::Main => {
                "\n1  Save images from a page\n2  Extract an attribute from a page\n\n0  <Exit)\n"
            }
            MenuPage::Images => "\nSave every image a page references.\n\n0  <Back)\n",
            MenuPage::Attributes => {
                "\nPrint an attribute of every element matching NAME=VALUE.\n\n0  <Back)\n"
            }
        }
    }
}

/// Pages from the main page to the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPath(Vec<MenuPage>);

impl Default for NavPath {
    fn default() -> Self {
        Self(vec![MenuPage::Main])
    }
}

impl NavPath {
    pub fn current(&self) -> MenuPage {
        self.0.last().copied().unwrap_or(MenuPage::Main)
    }

    pub fn push(&mut self, page: MenuPage) {
        self.0.push(page);
    }

    /// Leave the current page; `false` when already on the main page.
    pub fn back(&mut self) -> bool {
        if self.0.len() > 1 {
            self.0.pop();
            true
        } else {
            false
        }
    }

    pub fn display(&self) -> String {
        let ids: Vec<&str> = self.0.iter().map(|p| p.id()).collect();
        format!("- {}", ids.join(" > "))
    }
}

pub struct Menu<'s, R, W> {
    session: &'s mut Session,
    input: R,
    out: W,
    nav: NavPath,
    notice: Option<(String, Severity)>,
}

impl<'s, R: BufRead, W: Write> Menu<'s, R, W> {
    pub fn new(session: &'s mut Session, input: R, out: W) -> Self {
        Self {
            session,
            input,
            out,
            nav: NavPath::default(),
            notice: None,
        }
    }

    pub fn run(mut self) -> Result<()> {
        loop {
            self.print_interface()?;
            match self.nav.current() {
                MenuPage::Main => match self.read_choice()? {
                    None | Some(0) => {
                        self.out.write_all(CLEAR.as_bytes())?;
                        self.say("Exiting...", Severity::Plain)?;
                        return Ok(());
                    }
                    Some(1) => self.nav.push(MenuPage::Images),
                    Some(2) => self.nav.push(MenuPage::Attributes),
                    Some(n) => self.notice = Some((format!("Unknown option {n}"), Severity::Warning)),
                },
                MenuPage::Images => {
                    self.images_page()?;
                    self.nav.back();
                }
                MenuPage::Attributes => {
                    self.attributes_page()?;
                    self.nav.back();
                }
            }
        }
    }

    fn images_page(&mut self) -> Result<()> {
        let Some(url) = self.ask("Page URL (0 to go back):")? else {
            return Ok(());
        };
        let Some(scope) = self.ask_optional_pair(
            "Only inside elements with NAME=VALUE (blank for the whole page):",
        )?
        else {
            return Ok(());
        };

        let options = HarvestOptions { scope, limit: None };
        let persister = self.session.persister();
        let scribe = self.session.scribe();
        let mut bar = ProgressBar::new(BAR_WIDTH, true);
        let out = &mut self.out;
        let result = save_page_images(
            &mut self.session.scheduler,
            &persister,
            &url,
            &options,
            scribe,
            |done, total| {
                let _ = write!(out, "\r{}", bar.render(done, total));
                let _ = out.flush();
            },
        );
        writeln!(self.out)?;
        self.notice = Some(match result {
            Ok(summary) => (
                format!(
                    "Saved {} of {} image(s) to {}",
                    summary.saved.len(),
                    summary.found,
                    self.session.config.output_dir.display()
                ),
                Severity::Success,
            ),
            Err(e) => (format!("Could not read page: {e}"), Severity::Error),
        });
        Ok(())
    }

    fn attributes_page(&mut self) -> Result<()> {
        let Some(url) = self.ask("Page URL (0 to go back):")? else {
            return Ok(());
        };
        let Some(Some(matching)) = self.ask_optional_pair("Elements with NAME=VALUE:")? else {
            return Ok(());
        };
        let Some(get) = self.ask("Attribute to read:")? else {
            return Ok(());
        };
        let Some(child) = self.ask_child()? else {
            return Ok(());
        };

        let scribe = self.session.scribe();
        let page = match Page::fetch(&mut self.session.scheduler, &url, scribe) {
            Ok(p) => p,
            Err(e) => {
                self.notice = Some((format!("Could not read page: {e}"), Severity::Error));
                return Ok(());
            }
        };
        let values = attribute_values(&page, &matching, &get, child, None);
        self.notice = Some(if values.is_empty() {
            ("No values found".to_string(), Severity::Warning)
        } else {
            (values.join("\n"), Severity::Plain)
        });
        Ok(())
    }

    fn print_interface(&mut self) -> Result<()> {
        self.out.write_all(CLEAR.as_bytes())?;
        if self.session.config.ui.banner {
            self.say(BANNER, Severity::Plain)?;
        }
        let path = self.nav.display();
        self.say(&path, Severity::Plain)?;
        self.say(self.nav.current().body(), Severity::Plain)?;
        if let Some((msg, severity)) = self.notice.take() {
            self.say(&msg, severity)?;
        }
        Ok(())
    }

    fn say(&mut self, message: &str, severity: Severity) -> Result<()> {
        writeln!(self.out, "{}", self.session.console.paint(message, severity))?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        write!(self.out, "{PROMPT}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Numeric choice; re-prompts on anything that isn't a number.
    fn read_choice(&mut self) -> Result<Option<usize>> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.parse::<usize>() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => {
                    self.print_interface()?;
                    self.say("Invalid character", Severity::Error)?;
                }
            }
        }
    }

    /// Free-text answer; `None` on `0`, empty input or end of input.
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.say(question, Severity::Plain)?;
        Ok(self.read_line()?.filter(|s| !s.is_empty() && s != "0"))
    }

    /// `Some(None)` for a blank answer, `None` to abandon the page.
    fn ask_optional_pair(&mut self, question: &str) -> Result<Option<Option<(String, String)>>> {
        self.say(question, Severity::Plain)?;
        let Some(line) = self.read_line()? else {
            return Ok(None);
        };
        if line.is_empty() {
            return Ok(Some(None));
        }
        match parse_attr_pair(&line) {
            Ok(pair) => Ok(Some(Some(pair))),
            Err(e) => {
                self.notice = Some((e, Severity::Error));
                Ok(None)
            }
        }
    }

    /// 1-based child occurrence, blank for the element itself.
    fn ask_child(&mut self) -> Result<Option<Option<usize>>> {
        self.say(
            "Read from the N-th descendant carrying it (blank for the element itself):",
            Severity::Plain,
        )?;
        let Some(line) = self.read_line()? else {
            return Ok(None);
        };
        if line.is_empty() {
            return Ok(Some(None));
        }
        match line.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(Some(n))),
            _ => {
                self.notice = Some(("Invalid character".to_string(), Severity::Error));
                Ok(None)
            }
        }
    }
}
