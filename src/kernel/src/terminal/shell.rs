//! Keyword script runner.
//!
//! Scripts use the plain-text Robot layout: cells separated by a tab or two
//! or more spaces, `#` comments, `*** Section ***` headers. Under
//! `*** Test Cases ***` an unindented line names a test and indented lines are
//! its steps; a file with no header is one anonymous test. A failing step
//! ends its test, and the next test carries on with the same library state.
//!
//! Besides the library keywords the runner understands `${var}=` assignment
//! from `Read From File`, `${var}` substitution, `Should Be Equal` and `Log`.

use std::collections::BTreeMap;

use rtsim_common::{Result, SimError};
use rtsim_hal::Clock;

use super::commands::{normalize, Keyword};
use crate::library::RtosLibrary;

/// A failed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// 1-based line number of the step.
    pub line: usize,
    /// Why it failed.
    pub error: SimError,
}

/// Result of one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    /// Test name.
    pub name: String,
    /// Steps that ran, including a failing one.
    pub steps: usize,
    /// First failure, if any.
    pub failure: Option<Failure>,
}

impl TestOutcome {
    /// Whether every step passed.
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Result of a whole script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Tests in script order.
    pub tests: Vec<TestOutcome>,
}

impl ScriptReport {
    /// Number of passing tests.
    pub fn passed(&self) -> usize {
        self.tests.iter().filter(|t| t.passed()).count()
    }

    /// Number of failing tests.
    pub fn failed(&self) -> usize {
        self.tests.len() - self.passed()
    }

    /// True when no test failed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// No header seen: every line is a step.
    Bare,
    TestCases,
    /// Settings, variables and the like: ignored.
    Other,
}

/// Split a line into its cells.
pub fn split_cells(line: &str) -> Vec<&str> {
    line.split('\t')
        .flat_map(|cell| cell.split("  "))
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Runs keyword scripts against a library.
pub struct ScriptRunner<'a, C: Clock> {
    library: &'a mut RtosLibrary<C>,
    variables: BTreeMap<String, String>,
}

impl<'a, C: Clock> ScriptRunner<'a, C> {
    /// Create a runner over `library`.
    pub fn new(library: &'a mut RtosLibrary<C>) -> Self {
        Self {
            library,
            variables: BTreeMap::new(),
        }
    }

    /// Current value of a script variable.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Run a script.
    pub fn run(&mut self, source: &str) -> ScriptReport {
        let mut report = ScriptReport::default();
        let mut section = Section::Bare;
        let mut current: Option<TestOutcome> = None;

        for (index, raw) in source.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed.starts_with('*') {
                section = parse_header(trimmed);
                report.tests.extend(current.take());
                continue;
            }

            let indented = raw.starts_with(' ') || raw.starts_with('\t');
            match section {
                Section::Other => continue,
                Section::TestCases if !indented => {
                    report.tests.extend(current.take());
                    current = Some(new_test(trimmed));
                    continue;
                }
                _ => {}
            }

            let test = current.get_or_insert_with(|| new_test("(script)"));
            if test.failure.is_some() {
                continue;
            }
            let cells = split_cells(trimmed);
            if cells.first().map_or(true, |c| c.starts_with('[')) {
                continue;
            }
            test.steps += 1;
            if let Err(error) = self.run_step(&cells) {
                log::error!("line {}: {}", line_no, error);
                test.failure = Some(Failure {
                    line: line_no,
                    error,
                });
            }
        }
        report.tests.extend(current.take());
        report
    }

    /// Run one step given as cells.
    pub fn run_step(&mut self, cells: &[&str]) -> Result<()> {
        let (target, cells) = match cells.split_first() {
            Some((first, rest)) if first.starts_with("${") && first.ends_with('=') => {
                let name = first.trim_end_matches('=').trim();
                (Some(variable_name(name)?), rest)
            }
            _ => (None, cells),
        };
        let (keyword, args) = cells
            .split_first()
            .ok_or_else(|| SimError::InvalidArgument("assignment without keyword".into()))?;
        let args = args
            .iter()
            .map(|arg| self.substitute(arg))
            .collect::<Result<Vec<_>>>()?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let value = match normalize(keyword).as_str() {
            "shouldbeequal" => {
                should_be_equal(&args)?;
                None
            }
            "log" => {
                log::info!("{}", args.join(" "));
                None
            }
            _ => {
                let defaults = self.library.defaults().clone();
                Keyword::parse(keyword, &args, &defaults)?.execute(&mut *self.library)?
            }
        };

        if let Some(target) = target {
            let value = value.ok_or_else(|| {
                SimError::InvalidArgument(format!("{} returns no value", keyword))
            })?;
            self.variables.insert(target.to_string(), value);
        }
        Ok(())
    }

    fn substitute(&self, cell: &str) -> Result<String> {
        let mut out = String::with_capacity(cell.len());
        let mut rest = cell;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                SimError::InvalidArgument(format!("unclosed variable in '{}'", cell))
            })?;
            let name = &after[..end];
            let value = self.variables.get(name).ok_or_else(|| {
                SimError::InvalidArgument(format!("variable '${{{}}}' not found", name))
            })?;
            out.push_str(value);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn parse_header(line: &str) -> Section {
    let name = normalize(line.trim_matches('*'));
    match name.as_str() {
        "testcases" | "testcase" | "tasks" | "task" => Section::TestCases,
        _ => Section::Other,
    }
}

fn new_test(name: &str) -> TestOutcome {
    log::info!("Test '{}'", name);
    TestOutcome {
        name: name.to_string(),
        steps: 0,
        failure: None,
    }
}

fn variable_name(cell: &str) -> Result<&str> {
    cell.strip_prefix("${")
        .and_then(|c| c.strip_suffix('}'))
        .filter(|c| !c.is_empty())
        .ok_or_else(|| SimError::InvalidArgument(format!("bad variable '{}'", cell)))
}

fn should_be_equal(args: &[&str]) -> Result<()> {
    match args {
        [first, second] if first == second => Ok(()),
        [first, second] => Err(SimError::PreconditionFailed(format!(
            "{} != {}",
            first, second
        ))),
        _ => Err(SimError::InvalidArgument(format!(
            "Should Be Equal expects 2 arguments, got {}",
            args.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::fs::RamFs;
    use rtsim_common::ErrorClass;

    fn library() -> RtosLibrary<ManualClock> {
        RtosLibrary::with_parts(&Config::default(), ManualClock::new(), Box::new(RamFs::new()))
    }

    #[test]
    fn test_split_cells() {
        assert_eq!(
            split_cells("Write To File    TestFile.txt    Hello, RTOS!"),
            vec!["Write To File", "TestFile.txt", "Hello, RTOS!"]
        );
        assert_eq!(split_cells("Lock Mutex\tm1"), vec!["Lock Mutex", "m1"]);
        assert_eq!(split_cells("Create Task   a   1"), vec!["Create Task", "a", "1"]);
    }

    #[test]
    fn test_bare_script() {
        let mut lib = library();
        let report = ScriptRunner::new(&mut lib).run(
            "# mutex round trip\n\
             Create Mutex    m\n\
             Lock Mutex    m\n\
             Mutex Should Be Locked    m\n\
             Unlock Mutex    m\n",
        );
        assert!(report.is_success());
        assert_eq!(report.tests.len(), 1);
        assert_eq!(report.tests[0].steps, 4);
    }

    #[test]
    fn test_failure_stops_test_only() {
        let mut lib = library();
        let script = "\
*** Settings ***
Library    rtos_library.py

*** Test Cases ***
Double Lock
    [Documentation]    Second lock must fail.
    Create Mutex    m
    Lock Mutex    m
    Lock Mutex    m
    Create Task    never

Task Survives
    Create Task    t    2
    Task Priority Should Be    t    2
    Mutex Should Be Locked    m
";
        let report = ScriptRunner::new(&mut lib).run(script);

        assert_eq!(report.tests.len(), 2);
        let first = &report.tests[0];
        assert_eq!(first.name, "Double Lock");
        assert_eq!(first.steps, 3);
        let failure = first.failure.as_ref().unwrap();
        assert_eq!(failure.line, 9);
        assert_eq!(failure.error, SimError::AlreadyLocked { name: "m".into() });
        assert!(lib.tasks().get("never").is_err());

        assert!(report.tests[1].passed());
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_variables_and_should_be_equal() {
        let mut lib = library();
        let mut runner = ScriptRunner::new(&mut lib);
        let report = runner.run(
            "Create File    TestFile.txt\n\
             Write To File    TestFile.txt    Hello, RTOS!\n\
             ${content}=    Read From File    TestFile.txt\n\
             Should Be Equal    ${content}    Hello, RTOS!\n\
             Log    read ${content}\n",
        );
        assert!(report.is_success(), "{:?}", report);
        assert_eq!(runner.variable("content"), Some("Hello, RTOS!"));
    }

    #[test]
    fn test_step_errors() {
        let mut lib = library();
        let mut runner = ScriptRunner::new(&mut lib);
        assert_eq!(
            runner.run_step(&["Should Be Equal", "a", "b"]).unwrap_err().class(),
            ErrorClass::PreconditionFailed
        );
        assert_eq!(
            runner.run_step(&["Log", "${missing}"]).unwrap_err().class(),
            ErrorClass::InvalidInput
        );
        assert_eq!(
            runner.run_step(&["${x}=", "Create Mutex", "m"]).unwrap_err().class(),
            ErrorClass::InvalidInput
        );
        assert_eq!(
            runner.run_step(&["Frobnicate"]).unwrap_err(),
            SimError::UnknownKeyword("Frobnicate".into())
        );
    }
}
