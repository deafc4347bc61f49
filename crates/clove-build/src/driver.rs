//! Running generated scripts in an external interpreter
//!
//! The script is written to a file in the scratch directory and loaded by the
//! interpreter. Both output streams are pumped on their own thread into a
//! [`LineDecoder`], so the handlers see complete lines and neither pipe can
//! fill up and stall the child.

use crate::decoder::{LineDecoder, LineHandler};
use crate::error::{BuildError, BuildResult};
use clove_config::InterpreterConfig;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info};

/// Stderr lines kept for the `ProcessFailed` diagnostic
const STDERR_TAIL_LINES: usize = 50;

/// How to launch the interpreter: `program jvm_args.. main_class load_flag script`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: PathBuf,
    pub jvm_args: Vec<String>,
    pub main_class: Option<String>,
    pub load_flag: Option<String>,
}

impl Interpreter {
    /// `java -Dfile.encoding=UTF8 clojure.main -i <script>`
    pub fn clojure() -> Self {
        Self {
            program: PathBuf::from("java"),
            jvm_args: vec!["-Dfile.encoding=UTF8".to_string()],
            main_class: Some("clojure.main".to_string()),
            load_flag: Some("-i".to_string()),
        }
    }

    /// Clojure launcher with the configured program and extra JVM arguments
    pub fn from_config(config: &InterpreterConfig) -> Self {
        let mut interpreter = Self::clojure();
        if let Some(program) = &config.program {
            interpreter.program = program.clone();
        }
        interpreter.jvm_args.extend(config.jvm_args.iter().cloned());
        interpreter
    }

    /// Launch a script directly with `program`, e.g. a shell
    pub fn script_runner(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            jvm_args: Vec::new(),
            main_class: None,
            load_flag: None,
        }
    }

    /// Arguments after the program name
    pub fn args(&self, script: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.jvm_args.iter().map(OsString::from).collect();
        args.extend(self.main_class.iter().map(OsString::from));
        args.extend(self.load_flag.iter().map(OsString::from));
        args.push(script.as_os_str().to_os_string());
        args
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::clojure()
    }
}

/// Handlers returned from a successful run
#[derive(Debug)]
pub struct ProcessOutput<O, E> {
    pub exit_code: i32,
    pub stdout: O,
    pub stderr: E,
}

/// Forwards lines while remembering the last few
#[derive(Debug)]
struct TailCapture<H> {
    inner: H,
    lines: VecDeque<String>,
}

impl<H: LineHandler> TailCapture<H> {
    fn new(inner: H) -> Self {
        Self {
            inner,
            lines: VecDeque::with_capacity(STDERR_TAIL_LINES),
        }
    }

    fn text(&self) -> String {
        self.lines.iter().map(String::as_str).collect()
    }
}

impl<H: LineHandler> LineHandler for TailCapture<H> {
    fn handle_line(&mut self, line: &str) {
        if self.lines.len() == STDERR_TAIL_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
        self.inner.handle_line(line);
    }
}

/// Runs scripts in the interpreter
#[derive(Debug, Clone)]
pub struct ProcessDriver {
    interpreter: Interpreter,
    scratch_dir: PathBuf,
    working_dir: Option<PathBuf>,
}

impl ProcessDriver {
    /// Create a driver writing script files into `scratch_dir`
    pub fn new(interpreter: Interpreter, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter,
            scratch_dir: scratch_dir.into(),
            working_dir: None,
        }
    }

    /// Run the child in `dir` instead of the current directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Run `script` with `classpath`, feeding the child's output to the handlers.
    ///
    /// Returns once the child has exited and both streams are drained and
    /// flushed. A non-zero exit is a `ProcessFailed` error carrying the tail
    /// of stderr. Script files are left in the scratch directory.
    pub fn run<O, E>(
        &self,
        script: &str,
        classpath: &[PathBuf],
        stdout: O,
        stderr: E,
    ) -> BuildResult<ProcessOutput<O, E>>
    where
        O: LineHandler + Send,
        E: LineHandler + Send,
    {
        let script_path = self.write_script(script)?;
        let classpath = std::env::join_paths(classpath)
            .map_err(|e| BuildError::InvalidClasspath(e.to_string()))?;

        let mut command = Command::new(&self.interpreter.program);
        command
            .args(self.interpreter.args(&script_path))
            .env("CLASSPATH", &classpath)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        info!(
            program = %self.interpreter.program.display(),
            script = %script_path.display(),
            "Launching interpreter"
        );
        debug!(classpath = ?classpath, "Interpreter classpath");

        let mut child = command.spawn().map_err(|error| BuildError::ProcessSpawn {
            program: self.interpreter.program.clone(),
            error,
        })?;

        let (child_stdout, child_stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(out), Some(err)) => (out, err),
            _ => {
                return Err(BuildError::StateError(
                    "child process streams were not captured".to_string(),
                ))
            }
        };

        let (stdout, stderr, status) = thread::scope(|scope| {
            let out_reader = scope.spawn(move || pump(child_stdout, stdout));
            let err_reader = scope.spawn(move || pump(child_stderr, TailCapture::new(stderr)));
            let status = child.wait();
            (join(out_reader), join(err_reader), status)
        });

        let status = status?;
        let stdout = stdout?;
        let stderr = stderr?;

        let exit_code = status.code().unwrap_or(1);
        debug!(exit_code, "Interpreter exited");
        if exit_code != 0 {
            return Err(BuildError::process_failed(exit_code, stderr.text()));
        }

        Ok(ProcessOutput {
            exit_code,
            stdout,
            stderr: stderr.inner,
        })
    }

    fn write_script(&self, script: &str) -> BuildResult<PathBuf> {
        let dir = &self.scratch_dir;
        fs::create_dir_all(dir).map_err(|e| BuildError::temporary_file(dir, e))?;

        let mut file = tempfile::Builder::new()
            .prefix("clojure-compiler")
            .suffix(".clj")
            .tempfile_in(dir)
            .map_err(|e| BuildError::temporary_file(dir, e))?;
        writeln!(file, "{}", script).map_err(|e| BuildError::temporary_file(dir, e))?;

        let (_, path) = file
            .keep()
            .map_err(|e| BuildError::temporary_file(dir, e.error))?;
        debug!(path = %path.display(), "Wrote script file");
        Ok(path)
    }
}

/// Decode everything from `reader` into `handler`, then flush the last line
fn pump<R: Read, H: LineHandler>(mut reader: R, handler: H) -> io::Result<H> {
    let mut decoder = LineDecoder::new(handler);
    io::copy(&mut reader, &mut decoder)?;
    Ok(decoder.finish())
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}
