//! Static variable audit.
//!
//! Scans a compiled template for substitution sites that are a single
//! bare dot-path and reports the top-level names it finds, together
//! with the ones absent from the root bindings. This lets a caller
//! fail fast before rendering instead of discovering an empty-string
//! substitution in a generated file after the fact.
use super::bindings::Bindings;
use super::engine::Template;
use super::language::{Expression, Statement, Term};

/// Names referenced by a template and the subset missing
/// from the root bindings.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Audit {
    pub referenced: Vec<String>,
    pub missing: Vec<String>,
}

/// Loop-local names the renderer supplies itself; never reported.
const LOOP_LOCALS: &[&str] = &["this", "@index", "@first", "@last"];

/// Audit a template against root bindings.
///
/// Only plain substitution sites count: helper calls and conditions
/// evaluate to something rather than substituting a value directly,
/// so they are not reported here.
pub fn audit(template: &Template, bindings: &Bindings) -> Audit {
    let mut referenced = vec![];
    collect(template.statements(), &mut referenced);

    let missing = referenced
        .iter()
        .filter(|name| !bindings.contains(name))
        .cloned()
        .collect();

    Audit {
        referenced,
        missing,
    }
}

fn collect(statements: &[Statement], referenced: &mut Vec<String>) {
    for statement in statements {
        match statement {
            Statement::Print { expression, .. } => {
                if let Expression::Term {
                    term: Term::Variable(path),
                } = expression
                {
                    let head = match path.split('.').next() {
                        Some(head) => head,
                        None => continue,
                    };

                    if LOOP_LOCALS.contains(&head) {
                        continue;
                    }

                    if !referenced.iter().any(|name| name == head) {
                        referenced.push(head.to_string());
                    }
                }
            }

            Statement::If {
                then_body,
                else_body,
                ..
            } => {
                collect(then_body, referenced);
                collect(else_body, referenced);
            }

            Statement::Each { body, .. } => collect(body, referenced),

            Statement::Text(_) => (),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_missing_name() -> Result<(), Error> {
        let template = Template::from_str("{{foo}}")?;
        let report = audit(&template, &Bindings::new());

        assert_eq!(report.referenced, vec!["foo"]);
        assert_eq!(report.missing, vec!["foo"]);

        Ok(())
    }

    #[test]
    fn test_present_names_not_missing() -> Result<(), Error> {
        let template = Template::from_str("{{name}} {{title}}")?;
        let bindings = Bindings::try_from([("name", "x")])?;
        let report = audit(&template, &bindings);

        assert_eq!(report.referenced, vec!["name", "title"]);
        assert_eq!(report.missing, vec!["title"]);

        Ok(())
    }

    #[test]
    fn test_dotted_path_reports_head() -> Result<(), Error> {
        let template = Template::from_str("{{user.name}} {{user.email}}")?;
        let report = audit(&template, &Bindings::new());

        assert_eq!(report.referenced, vec!["user"]);
        assert_eq!(report.missing, vec!["user"]);

        Ok(())
    }

    #[test]
    fn test_loop_locals_excluded() -> Result<(), Error> {
        let template =
            Template::from_str("{{#each items}}{{@index}}:{{this}}:{{label}}{{/each}}")?;
        let report = audit(&template, &Bindings::new());

        assert_eq!(report.referenced, vec!["label"]);

        Ok(())
    }

    #[test]
    fn test_helper_calls_excluded() -> Result<(), Error> {
        let template = Template::from_str("{{default name 'anon'}}{{plain}}")?;
        let report = audit(&template, &Bindings::new());

        assert_eq!(report.referenced, vec!["plain"]);

        Ok(())
    }

    #[test]
    fn test_branches_and_raw_sites_scanned() -> Result<(), Error> {
        let template =
            Template::from_str("{{#if cond}}{{inside}}{{else}}{{{other}}}{{/if}}")?;
        let report = audit(&template, &Bindings::new());

        // The condition itself isn't a substitution site; its branches are.
        assert_eq!(report.referenced, vec!["inside", "other"]);

        Ok(())
    }
}
