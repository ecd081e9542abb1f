//! Command-mode driver.
//!
//! Each command is one line: a verb followed by its arguments, e.g.
//! `set B2 = SUM(A1:A3)`. Rows are 1-based and columns are letters, the
//! same way cell labels read.

use cellgrid_core::{Position, Sheet};
use cellgrid_engine::engine::BUILTINS;
use log::debug;

use crate::error::{CommandError, Result};

/// A parsed driver command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Write content (possibly empty) to a cell.
    Set(Position, String),
    Clear(Position),
    /// Print the evaluated content.
    Get(Position),
    /// Print the raw content.
    Raw(Position),
    /// Print the color, or set it when one is given.
    Color(Position, Option<String>),
    InsertRow(usize),
    DeleteRow(usize),
    InsertColumn(usize),
    DeleteColumn(usize),
    /// List distinct values under a header, or the rows matching a value.
    Filter(Position, Option<String>),
    Matrix,
    Functions,
    Size,
}

impl Command {
    /// Parse a single command line.
    pub fn parse(line: &str) -> Result<Command> {
        let line = line.trim();
        let parts: Vec<&str> = line.splitn(2, ' ').collect();
        let command = parts[0];
        let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

        match command {
            "set" => {
                let (label, content) = split_label(args);
                let pos = parse_label("set", label)?;
                Ok(Command::Set(pos, content.to_string()))
            }
            "clear" => Ok(Command::Clear(single_label("clear", args)?)),
            "get" => Ok(Command::Get(single_label("get", args)?)),
            "raw" => Ok(Command::Raw(single_label("raw", args)?)),
            "color" => {
                let (label, color) = split_label(args);
                let pos = parse_label("color", label)?;
                Ok(Command::Color(pos, non_empty(color)))
            }
            "filter" => {
                let (label, value) = split_label(args);
                let pos = parse_label("filter", label)?;
                Ok(Command::Filter(pos, non_empty(value)))
            }
            "insert-row" => Ok(Command::InsertRow(parse_row("insert-row", args)?)),
            "delete-row" => Ok(Command::DeleteRow(parse_row("delete-row", args)?)),
            "insert-col" => Ok(Command::InsertColumn(parse_column("insert-col", args)?)),
            "delete-col" => Ok(Command::DeleteColumn(parse_column("delete-col", args)?)),
            "matrix" => no_args("matrix", args, Command::Matrix),
            "functions" => no_args("functions", args, Command::Functions),
            "size" => no_args("size", args, Command::Size),
            _ => Err(CommandError::UnknownCommand(command.to_string())),
        }
    }

    /// Apply the command to `sheet`, returning the lines to print.
    pub fn execute(self, sheet: &mut Sheet) -> Result<Vec<String>> {
        debug!("Executing {:?}", self);
        match self {
            Command::Set(pos, content) => {
                ensure_inside(sheet, pos)?;
                sheet.set_content(pos.row, pos.col, &content);
                Ok(Vec::new())
            }
            Command::Clear(pos) => {
                ensure_inside(sheet, pos)?;
                sheet.clear_cell(pos.row, pos.col);
                Ok(Vec::new())
            }
            Command::Get(pos) => {
                let value = sheet
                    .evaluated_content(pos.row, pos.col)
                    .ok_or_else(|| CommandError::OutOfBounds(pos.label()))?;
                Ok(vec![value.to_string()])
            }
            Command::Raw(pos) => {
                let value = sheet
                    .raw_content(pos.row, pos.col)
                    .ok_or_else(|| CommandError::OutOfBounds(pos.label()))?;
                Ok(vec![value.to_string()])
            }
            Command::Color(pos, None) => {
                let color = sheet
                    .color(pos.row, pos.col)
                    .ok_or_else(|| CommandError::OutOfBounds(pos.label()))?;
                Ok(vec![color.to_string()])
            }
            Command::Color(pos, Some(color)) => {
                ensure_inside(sheet, pos)?;
                sheet.recolor(pos.row, pos.col, &color);
                Ok(Vec::new())
            }
            Command::InsertRow(row) => {
                sheet.add_row(row)?;
                Ok(Vec::new())
            }
            Command::DeleteRow(row) => {
                sheet.delete_row(row)?;
                Ok(Vec::new())
            }
            Command::InsertColumn(col) => {
                sheet.add_column(col)?;
                Ok(Vec::new())
            }
            Command::DeleteColumn(col) => {
                sheet.delete_column(col)?;
                Ok(Vec::new())
            }
            Command::Filter(pos, None) => {
                ensure_inside(sheet, pos)?;
                Ok(sheet.filter_list(pos.row, pos.col).into_iter().collect())
            }
            Command::Filter(pos, Some(value)) => {
                ensure_inside(sheet, pos)?;
                Ok(sheet
                    .filter_column(&value, pos.row, pos.col)
                    .into_iter()
                    .map(|row| Position::new(row, pos.col).label())
                    .collect())
            }
            Command::Matrix => Ok(sheet
                .raw_matrix()
                .into_iter()
                .map(|row| row.join("\t"))
                .collect()),
            Command::Functions => Ok(BUILTINS
                .iter()
                .map(|b| format!("{} - {}", b.name, b.description))
                .collect()),
            Command::Size => Ok(vec![format!("{}x{}", sheet.rows(), sheet.cols())]),
        }
    }
}

/// Parse and execute one line.
pub fn run_line(sheet: &mut Sheet, line: &str) -> Result<Vec<String>> {
    Command::parse(line)?.execute(sheet)
}

/// Split `args` into its first word and the (trimmed) rest.
fn split_label(args: &str) -> (&str, &str) {
    match args.split_once(' ') {
        Some((label, rest)) => (label, rest.trim()),
        None => (args, ""),
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_label(command: &'static str, label: &str) -> Result<Position> {
    if label.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            what: "a cell label",
        });
    }
    Position::from_label(label).ok_or_else(|| CommandError::InvalidLabel(label.to_string()))
}

fn single_label(command: &'static str, args: &str) -> Result<Position> {
    let (label, rest) = split_label(args);
    if !rest.is_empty() {
        return Err(CommandError::UnexpectedArgument {
            command,
            arg: rest.to_string(),
        });
    }
    parse_label(command, label)
}

/// 1-based row number to a row index.
fn parse_row(command: &'static str, args: &str) -> Result<usize> {
    if args.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            what: "a row number",
        });
    }
    args.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| CommandError::InvalidRow(args.to_string()))
}

fn parse_column(command: &'static str, args: &str) -> Result<usize> {
    if args.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            what: "column letters",
        });
    }
    Position::letters_to_col(args).ok_or_else(|| CommandError::InvalidColumn(args.to_string()))
}

fn no_args(command: &'static str, args: &str, parsed: Command) -> Result<Command> {
    if args.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnexpectedArgument {
            command,
            arg: args.to_string(),
        })
    }
}

fn ensure_inside(sheet: &Sheet, pos: Position) -> Result<()> {
    if sheet.contains(pos) {
        Ok(())
    } else {
        Err(CommandError::OutOfBounds(pos.label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_core::SheetError;
    use cellgrid_engine::engine::messages;

    fn run(sheet: &mut Sheet, lines: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        for line in lines {
            out.extend(run_line(sheet, line).unwrap());
        }
        out
    }

    #[test]
    fn test_parse_set_keeps_content_spacing() {
        assert_eq!(
            Command::parse("set b2 = SUM(A1, A2) + 1").unwrap(),
            Command::Set(Position::new(1, 1), "= SUM(A1, A2) + 1".to_string())
        );
        assert_eq!(
            Command::parse("set A1").unwrap(),
            Command::Set(Position::new(0, 0), String::new())
        );
    }

    #[test]
    fn test_parse_structural_commands() {
        assert_eq!(Command::parse("insert-row 1").unwrap(), Command::InsertRow(0));
        assert_eq!(Command::parse("delete-row 30").unwrap(), Command::DeleteRow(29));
        assert_eq!(Command::parse("insert-col AA").unwrap(), Command::InsertColumn(26));
        assert_eq!(Command::parse("delete-col b").unwrap(), Command::DeleteColumn(1));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Command::parse("frobnicate A1"),
            Err(CommandError::UnknownCommand("frobnicate".to_string()))
        );
        assert_eq!(
            Command::parse("get"),
            Err(CommandError::MissingArgument {
                command: "get",
                what: "a cell label"
            })
        );
        assert_eq!(
            Command::parse("get A0"),
            Err(CommandError::InvalidLabel("A0".to_string()))
        );
        assert_eq!(
            Command::parse("delete-row 0"),
            Err(CommandError::InvalidRow("0".to_string()))
        );
        assert_eq!(
            Command::parse("insert-col 3"),
            Err(CommandError::InvalidColumn("3".to_string()))
        );
        assert!(matches!(
            Command::parse("size now"),
            Err(CommandError::UnexpectedArgument { command: "size", .. })
        ));
    }

    #[test]
    fn test_set_and_get() {
        let mut sheet = Sheet::new(5, 5);
        let out = run(
            &mut sheet,
            &[
                "set A1 2",
                "set A2 3",
                "set B1 = SUM(A1:A2) * 2",
                "get B1",
                "raw B1",
                "set A2 4",
                "get B1",
            ],
        );
        assert_eq!(out, vec!["10", "= SUM(A1:A2) * 2", "12"]);
    }

    #[test]
    fn test_cell_errors_are_values() {
        let mut sheet = Sheet::new(5, 5);
        let out = run(
            &mut sheet,
            &[
                "set A1 = REF(B1)",
                "set B1 = REF(A1)",
                "get B1",
                "set C1 = REF(C1)",
                "get C1",
            ],
        );
        assert_eq!(
            out,
            vec![messages::CIRCULAR_REFERENCE, messages::INVALID_POSITION]
        );
    }

    #[test]
    fn test_out_of_bounds() {
        let mut sheet = Sheet::new(2, 2);
        assert_eq!(
            run_line(&mut sheet, "set C1 5"),
            Err(CommandError::OutOfBounds("C1".to_string()))
        );
        assert_eq!(
            run_line(&mut sheet, "get A3"),
            Err(CommandError::OutOfBounds("A3".to_string()))
        );
        assert_eq!(
            run_line(&mut sheet, "delete-row 3"),
            Err(CommandError::Sheet(SheetError::RowOutOfRange { index: 2, rows: 2 }))
        );
    }

    #[test]
    fn test_structural_edits_and_size() {
        let mut sheet = Sheet::new(3, 3);
        let out = run(
            &mut sheet,
            &[
                "set A2 7",
                "set A1 = REF(A2) + 1",
                "insert-row 2",
                "raw A1",
                "get A1",
                "insert-col A",
                "raw B1",
                "delete-row 3",
                "get B1",
                "size",
            ],
        );
        assert_eq!(
            out,
            vec![
                "= REF(A3) + 1",
                "8",
                "= REF(B3) + 1",
                messages::INVALID_REFERENCE,
                "3x4"
            ]
        );
    }

    #[test]
    fn test_filter_and_color() {
        let mut sheet = Sheet::new(3, 6);
        let out = run(
            &mut sheet,
            &[
                "set A1 city",
                "set A2 boston",
                "set A3 salem",
                "set A4 boston",
                "filter A1",
                "filter A1 boston",
                "color A2 #FF0000",
                "color A2",
                "color A3",
            ],
        );
        assert_eq!(
            out,
            vec!["boston", "salem", "A2", "A4", "#FF0000", "#FFFFFF"]
        );
    }

    #[test]
    fn test_matrix_and_functions() {
        let mut sheet = Sheet::new(2, 2);
        let out = run(&mut sheet, &["set B1 x", "set A2 = 1 + 1", "matrix"]);
        assert_eq!(out, vec!["\tx", "= 1 + 1\t"]);

        let functions = run(&mut sheet, &["functions"]);
        assert_eq!(functions.len(), BUILTINS.len());
        assert!(functions[0].starts_with("REF - "));
    }
}
