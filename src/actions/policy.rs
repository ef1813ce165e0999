//! Applying a deletion policy to the duplicate groups.
//!
//! Automatic and interactive removal share one flow: select per group,
//! collect every marked path, list them, ask once, then remove. Dry runs only
//! report. Hard linking needs no confirmation because nothing's content is
//! lost.

use std::io::{self, Write};
use std::path::PathBuf;

use yansi::{Condition, Paint};

use super::delete::{delete_file, validate_preserves_copy, Resolution};
use super::fs_ops::FileOps;
use super::link::{replace_with_link, LinkOutcome};
use super::prompt::Prompter;
use super::select::{automatic_marks, interactive_marks};
use super::DeletionPolicy;

/// Applies one [`DeletionPolicy`] to sorted duplicate groups.
///
/// Listings go to `out`; questions go through the [`Prompter`]. `out` is
/// flushed before every question so both can share a terminal.
pub struct PolicyEngine<'a> {
    fs: &'a dyn FileOps,
    prompter: &'a mut dyn Prompter,
    out: &'a mut dyn Write,
    color: bool,
}

impl<'a> PolicyEngine<'a> {
    /// Create an engine with colored labels.
    pub fn new(fs: &'a dyn FileOps, prompter: &'a mut dyn Prompter, out: &'a mut dyn Write) -> Self {
        Self {
            fs,
            prompter,
            out,
            color: true,
        }
    }

    /// Enable or disable colored `Keep`/`Delete` labels.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Apply `policy` to every group.
    ///
    /// Groups must be sorted and hold at least two paths each, as produced by
    /// [`duplicate_groups`](super::duplicate_groups); shorter groups are ignored.
    ///
    /// # Errors
    ///
    /// Only failures to write output or read answers. Per-file failures are
    /// collected in [`Resolution::failures`].
    pub fn apply(&mut self, policy: DeletionPolicy, groups: &[Vec<PathBuf>]) -> io::Result<Resolution> {
        let groups: Vec<&[PathBuf]> = groups
            .iter()
            .map(Vec::as_slice)
            .filter(|g| g.len() > 1)
            .collect();
        log::info!("Applying {} policy to {} group(s)", policy, groups.len());

        let resolution = match policy {
            DeletionPolicy::Automatic | DeletionPolicy::Interactive => {
                self.select_and_remove(policy, &groups)?
            }
            DeletionPolicy::DryRun => self.dry_run(&groups)?,
            DeletionPolicy::HardLink => self.hard_link(&groups)?,
        };

        self.out.flush()?;
        log::info!("{}", resolution.summary());
        Ok(resolution)
    }

    fn label(&self, text: &str, keep: bool) -> String {
        let condition = if self.color {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        };
        let padded = format!("{text:>6}");
        if keep {
            padded.green().whenever(condition).to_string()
        } else {
            padded.red().whenever(condition).to_string()
        }
    }

    fn print_keep_delete(&mut self, group: &[PathBuf]) -> io::Result<()> {
        writeln!(self.out)?;
        for (i, path) in group.iter().enumerate() {
            let label = if i == 0 {
                self.label("Keep", true)
            } else {
                self.label("Delete", false)
            };
            writeln!(self.out, "{label}: {}", path.display())?;
        }
        Ok(())
    }

    fn select_and_remove(
        &mut self,
        policy: DeletionPolicy,
        groups: &[&[PathBuf]],
    ) -> io::Result<Resolution> {
        let mut resolution = Resolution::default();
        let mut marked: Vec<PathBuf> = Vec::new();

        for group in groups {
            let marks = if policy == DeletionPolicy::Interactive {
                self.ask_group(group)?
            } else {
                self.print_keep_delete(group)?;
                automatic_marks(group)
            };

            if let Err(e) = validate_preserves_copy(&marks, group) {
                resolution.record_failure(e);
                continue;
            }
            marked.extend(marks);
        }

        if marked.is_empty() {
            writeln!(self.out, "Nothing to be deleted.")?;
            return Ok(resolution);
        }

        writeln!(self.out, "\nThe following files will be deleted:")?;
        for path in &marked {
            writeln!(self.out, "  {}", path.display())?;
        }
        self.out.flush()?;

        if !self.prompter.confirm("Is that OK?")? {
            writeln!(self.out, "OK then! Aborting.")?;
            resolution.declined = true;
            return Ok(resolution);
        }

        for path in marked {
            writeln!(self.out, "Deleting {}", path.display())?;
            match delete_file(self.fs, &path) {
                Ok(size) => {
                    resolution.bytes_freed += size;
                    resolution.removed.push(path);
                }
                Err(e) => {
                    writeln!(self.out, "Failed to remove {}: {}", path.display(), e)?;
                    resolution.record_failure(e);
                }
            }
        }
        Ok(resolution)
    }

    fn ask_group(&mut self, group: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
        writeln!(self.out)?;
        for (i, path) in group.iter().enumerate() {
            writeln!(self.out, "{:>6}: {}", i + 1, path.display())?;
        }
        self.out.flush()?;

        let kept = self.prompter.choose_keep(group.len())?;
        match kept.checked_sub(1).and_then(|i| group.get(i)) {
            Some(path) => writeln!(self.out, "Keeping {}", path.display())?,
            None => writeln!(self.out, "Keeping all")?,
        }
        Ok(interactive_marks(group, kept))
    }

    fn dry_run(&mut self, groups: &[&[PathBuf]]) -> io::Result<Resolution> {
        for group in groups {
            self.print_keep_delete(group)?;
        }
        writeln!(self.out, "\nNothing has been deleted, this was a dry run")?;
        Ok(Resolution::default())
    }

    fn hard_link(&mut self, groups: &[&[PathBuf]]) -> io::Result<Resolution> {
        let mut resolution = Resolution::default();

        for group in groups {
            let Some((canonical, rest)) = group.split_first() else {
                continue;
            };
            writeln!(self.out, "\nHard linking:\n {}\n To:", canonical.display())?;

            for path in rest {
                match replace_with_link(self.fs, canonical, path) {
                    Ok(LinkOutcome::Linked { freed }) => {
                        writeln!(self.out, " {}", path.display())?;
                        resolution.bytes_freed += freed;
                        resolution.linked.push(path.clone());
                    }
                    Ok(LinkOutcome::AlreadyLinked) => {
                        writeln!(self.out, " {} (already linked)", path.display())?;
                    }
                    Err(e) => {
                        writeln!(self.out, " {} FAILED: {}", path.display(), e)?;
                        resolution.record_failure(e);
                    }
                }
            }
        }
        Ok(resolution)
    }
}
