//! Interactive configuration editor (`ssm --configure`)
//!
//! Walks through each setting, then shows the result and asks before saving.
//! Blank input keeps the current value. Root saves to the system-wide config,
//! everyone else to their own.

use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use ssm_core::config::edit::{self, check_jump_host, parse_domains, validate_port};
use ssm_core::config::{load, sshpass_installed, ConfigPaths, SettingsDocument};
use ssm_core::home::is_root;
use ssm_core::resolver::{HostLookup, SystemLookup};
use std::io::{self, BufRead, Write};

const RULE: &str = "===============================================";

/// Execute `ssm --configure`
pub fn execute() -> Result<()> {
    let paths = ConfigPaths::discover()?;
    let settings = load(&paths)?;
    let path = edit::save_path(&paths, is_root());

    let stdin = io::stdin();
    let mut editor = Editor {
        input: stdin.lock(),
        output: io::stdout(),
        lookup: SystemLookup::default(),
        sshpass_installed: sshpass_installed(),
        clear_screen: true,
    };

    if let Some(document) = editor.run(settings.to_document())? {
        writeln!(editor.output, "Saving...")?;
        let saved = edit::save(&document, path)?;
        writeln!(editor.output, "Configuration saved at {}", saved.display())?;
    }

    Ok(())
}

struct Editor<R, W, L> {
    input: R,
    output: W,
    lookup: L,
    sshpass_installed: bool,
    clear_screen: bool,
}

impl<R: BufRead, W: Write, L: HostLookup> Editor<R, W, L> {
    /// Edit `document`; returns it when the user chooses to save.
    fn run(&mut self, mut document: SettingsDocument) -> Result<Option<SettingsDocument>> {
        self.clear()?;
        writeln!(self.output, "Welcome to the configuration utility for ssm!")?;
        self.show(&document)?;

        if !self.ask_yes_no("Would you like to edit the current configuration?")? {
            writeln!(self.output, "\nExiting the configuration utility\n")?;
            return Ok(None);
        }

        self.clear()?;
        document.ssh.port = self.edit_port("ssh port", &document.ssh.port)?;

        self.clear()?;
        document.ssh.jump = self.edit_jump_host(&document.ssh.jump)?;

        self.clear()?;
        document.ssh.sshpass = self.edit_sshpass()?;

        self.clear()?;
        document.tunnel.port = self.edit_port("proxy tunnel port", &document.tunnel.port)?;

        self.clear()?;
        document.domains = self.edit_domains(&document.domains)?;

        self.clear()?;
        self.show(&document)?;
        if self.ask_yes_no("Would you like to save the current configuration?")? {
            Ok(Some(document))
        } else {
            writeln!(self.output, "Exiting without saving!")?;
            Ok(None)
        }
    }

    fn edit_port(&mut self, name: &str, current: &str) -> Result<String> {
        loop {
            let response = self.ask_value(&format!("The current default {name} is {current}."))?;
            if response.is_empty() {
                return Ok(current.to_string());
            }

            match validate_port(&response) {
                Ok(port) => return Ok(port),
                Err(_) => writeln!(
                    self.output,
                    "Invalid port detected. Please enter a valid port number"
                )?,
            }
        }
    }

    fn edit_jump_host(&mut self, current: &str) -> Result<String> {
        loop {
            let response = self.ask_value(&format!("The current default jumphost is {current}."))?;
            if response.is_empty() {
                return Ok(current.to_string());
            }

            let Err(problem) = check_jump_host(&response, &self.lookup) else {
                return Ok(response);
            };

            let question = format!("{problem}. Would you like to use it anyways?");
            if self.ask_yes_no(&question)? {
                writeln!(self.output, "Forcing use of entered value...")?;
                return Ok(response);
            }
        }
    }

    fn edit_sshpass(&mut self) -> Result<bool> {
        let question = "Would you like to enable the use of sshpass to automate password logins?";
        let enable = self.ask_yes_no(question)?;

        if enable && !self.sshpass_installed {
            writeln!(
                self.output,
                "\nWarning:\n\
                 The sshpass utility does not appear to be installed, or is not located on the\n\
                 user's PATH. sshpass usage will be enabled but won't have any effect until the\n\
                 utility has been installed on your system or made available to the current user.\n"
            )?;
            write!(self.output, "Press Enter to continue")?;
            self.output.flush()?;
            self.read_line()?;
        }

        Ok(enable)
    }

    fn edit_domains(&mut self, current: &[String]) -> Result<Vec<String>> {
        let shown = if current.is_empty() {
            "(none)".to_string()
        } else {
            current.join(", ")
        };

        loop {
            let response = self.ask_value(&format!(
                "The current candidate domains are {shown}. \
                 Enter a comma separated list to replace them,"
            ))?;
            if response.is_empty() {
                return Ok(current.to_vec());
            }

            match parse_domains(&response) {
                Ok(domains) => return Ok(domains),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    fn show(&mut self, document: &SettingsDocument) -> Result<()> {
        writeln!(self.output, "{RULE}\n")?;
        writeln!(self.output, "The current configuration is:\n")?;
        writeln!(self.output, "{}", document.to_toml()?)?;
        writeln!(self.output, "{RULE}\n")?;
        Ok(())
    }

    fn ask_value(&mut self, prompt: &str) -> Result<String> {
        write!(
            self.output,
            "{prompt} Enter a new value or leave blank to keep the current setting: "
        )?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    /// Yes/no question defaulting to no. End of input counts as no.
    fn ask_yes_no(&mut self, question: &str) -> Result<bool> {
        loop {
            write!(self.output, "{question} [y/N]: ")?;
            self.output.flush()?;

            let Some(response) = self.read_line()? else {
                return Ok(false);
            };

            match response.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" | "" => return Ok(false),
                _ => writeln!(self.output, "Invalid response: Please enter \"y\" or \"n\"")?,
            }
        }
    }

    /// Next trimmed input line, `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            execute!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }
}
