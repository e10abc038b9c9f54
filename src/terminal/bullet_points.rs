const INDENT_SIZE: usize = 2;

/// Prints nested lists, either as bullet points or as tree branches.
pub struct BulletPointPrinter<W: LineWriter + Clone = StdoutLineWriter> {
    writer: W,
    nesting: usize,
}

impl<W: LineWriter + Clone> BulletPointPrinter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self { writer, nesting: 0 }
    }

    pub fn print_item(&self, message: impl std::fmt::Display) {
        self.writer
            .write_line(&format!("{}• {}", self.indentation(), message));
    }

    /// `├── message`, or `└── message` for the last item of a group
    pub fn print_branch(&self, message: impl std::fmt::Display, last: bool) {
        let branch = if last { "└──" } else { "├──" };
        self.writer
            .write_line(&format!("{}{} {}", self.indentation(), branch, message));
    }

    /// A line without a bullet at the current nesting level
    pub fn print_line(&self, message: impl std::fmt::Display) {
        self.writer
            .write_line(&format!("{}{}", self.indentation(), message));
    }

    pub fn indent(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            nesting: self.nesting + 1,
        }
    }

    fn indentation(&self) -> String {
        " ".repeat(self.nesting * INDENT_SIZE)
    }
}

impl BulletPointPrinter<StdoutLineWriter> {
    pub fn new() -> Self {
        Self::new_with_writer(StdoutLineWriter)
    }
}

pub trait LineWriter {
    fn write_line(&self, line: &str);
}

#[derive(Clone, Copy)]
pub struct StdoutLineWriter;
impl LineWriter for StdoutLineWriter {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}
