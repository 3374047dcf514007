use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use polka::api::{Domain, LinCons, LinExpr, PolyCfg, Polyhedron};

mod parse;
mod report;

use report::{BoundReport, Payload, Report};

#[derive(Parser)]
#[command(name = "polka-cli")]
#[command(about = "Run one convex-polyhedra operation on constraint systems given as text")]
struct Cmd {
    #[command(flatten)]
    opts: Opts,

    #[command(subcommand)]
    action: Action,
}

#[derive(Args, Clone, Debug, Default)]
struct Opts {
    /// Total number of dimensions; defaults to one past the largest `xN` used
    #[arg(long, global = true)]
    dims: Option<usize>,
    /// Leading dimensions that range over the integers
    #[arg(long, global = true, default_value_t = 0)]
    int_dims: usize,
    /// Represent strict inequalities exactly (epsilon column)
    #[arg(long, global = true)]
    strict: bool,
    /// Conversion row limit before falling back to top
    #[arg(long, global = true)]
    max_rows: Option<usize>,
    /// Per-operation timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// Also write the JSON report (plus a provenance sidecar) here
    #[arg(long, global = true)]
    out: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
enum Action {
    /// Minimize a system and print both representations
    Minimize { system: String },
    /// Intersection of two systems
    Meet { a: String, b: String },
    /// Convex hull of two systems
    Join { a: String, b: String },
    /// Standard widening `a ∇ (a ⊔ b)`, optionally with thresholds
    Widen {
        a: String,
        b: String,
        #[arg(long)]
        thresholds: Option<String>,
    },
    /// Range of an expression over a system
    Bound { system: String, expr: String },
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Minimize { .. } => "minimize",
            Action::Meet { .. } => "meet",
            Action::Join { .. } => "join",
            Action::Widen { .. } => "widen",
            Action::Bound { .. } => "bound",
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cmd = Cmd::parse();
    let report = run(&cmd.opts, &cmd.action)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if let Some(out) = &cmd.opts.out {
        report::write_report(out, &report)?;
        let params = serde_json::json!({
            "op": cmd.action.name(),
            "action": format!("{:?}", cmd.action),
            "int_dims": cmd.opts.int_dims,
            "strict": cmd.opts.strict,
        });
        let prov = report::write_sidecar(out, Payload::new(params))?;
        tracing::info!(out = %out.display(), provenance = %prov.display(), "report written");
    }
    Ok(())
}

fn domain(opts: &Opts) -> Domain {
    let mut cfg = if opts.strict {
        PolyCfg::strict()
    } else {
        PolyCfg::default()
    };
    if let Some(rows) = opts.max_rows {
        cfg.max_rows = rows;
    }
    cfg.timeout = opts.timeout_ms.map(Duration::from_millis);
    Domain::new(cfg)
}

/// Parsed systems plus the dimension count they share.
struct Inputs {
    systems: Vec<Vec<LinCons>>,
    exprs: Vec<LinExpr>,
    int_dims: usize,
    real_dims: usize,
}

impl Inputs {
    fn parse(opts: &Opts, systems: &[&str], exprs: &[&str]) -> Result<Self> {
        let systems = systems
            .iter()
            .map(|s| parse::parse_system(s).with_context(|| format!("parsing system `{s}`")))
            .collect::<Result<Vec<_>>>()?;
        let exprs = exprs
            .iter()
            .map(|e| parse::parse_expr(e).with_context(|| format!("parsing expression `{e}`")))
            .collect::<Result<Vec<_>>>()?;
        let used = parse::dims_used(systems.iter().flatten().map(|c| &c.expr).chain(exprs.iter()));
        let dims = match opts.dims {
            Some(d) if d < used => bail!("--dims {d} but dimension x{} is used", used - 1),
            Some(d) => d,
            None => used,
        };
        if opts.int_dims > dims {
            bail!("--int-dims {} exceeds the {dims} dimensions", opts.int_dims);
        }
        Ok(Self {
            systems,
            exprs,
            int_dims: opts.int_dims,
            real_dims: dims - opts.int_dims,
        })
    }

    fn polyhedron(&self, dom: &Domain, i: usize) -> Result<Polyhedron> {
        let out = Polyhedron::of_linear_constraints(dom, self.int_dims, self.real_dims, &self.systems[i])?;
        Ok(out.into_value())
    }
}

fn run(opts: &Opts, action: &Action) -> Result<Report> {
    let dom = domain(opts);
    let op = action.name();
    tracing::info!(op, strict = opts.strict, "run");
    let report = match action {
        Action::Minimize { system } => {
            let inp = Inputs::parse(opts, &[system.as_str()], &[])?;
            let p = Polyhedron::of_linear_constraints(&dom, inp.int_dims, inp.real_dims, &inp.systems[0])?;
            let out = p.value.minimize(&dom)?.and_flags(&p);
            Report::of_outcome(op, &dom, &out)?
        }
        Action::Meet { a, b } => {
            let inp = Inputs::parse(opts, &[a.as_str(), b.as_str()], &[])?;
            let out = inp.polyhedron(&dom, 0)?.meet(&dom, &inp.polyhedron(&dom, 1)?)?;
            Report::of_outcome(op, &dom, &out)?
        }
        Action::Join { a, b } => {
            let inp = Inputs::parse(opts, &[a.as_str(), b.as_str()], &[])?;
            let out = inp.polyhedron(&dom, 0)?.join(&dom, &inp.polyhedron(&dom, 1)?)?;
            Report::of_outcome(op, &dom, &out)?
        }
        Action::Widen { a, b, thresholds } => {
            let inp = Inputs::parse(opts, &[a.as_str(), b.as_str(), thresholds.as_deref().unwrap_or("")], &[])?;
            let pa = inp.polyhedron(&dom, 0)?;
            let upper = pa.join(&dom, &inp.polyhedron(&dom, 1)?)?.into_value();
            let out = if inp.systems[2].is_empty() {
                pa.widening(&dom, &upper)?
            } else {
                pa.widening_threshold(&dom, &upper, &inp.systems[2])?
            };
            Report::of_outcome(op, &dom, &out)?
        }
        Action::Bound { system, expr } => {
            let inp = Inputs::parse(opts, &[system.as_str()], &[expr.as_str()])?;
            let p = Polyhedron::of_linear_constraints(&dom, inp.int_dims, inp.real_dims, &inp.systems[0])?;
            let b = p.value.bound_linexpr(&dom, &inp.exprs[0])?;
            let mut r = Report::of_outcome(op, &dom, &p)?;
            r.exact = b.exact.and(p.exact).to_string();
            r.best = b.best.and(p.best).to_string();
            r.bound = Some(BoundReport::from(&b.value));
            r
        }
    };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn opts() -> Opts {
        Opts::default()
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cmd = Cmd::try_parse_from(["polka-cli", "meet", "x0 >= 0", "x0 <= 1", "--strict", "--dims", "3"]).unwrap();
        assert!(cmd.opts.strict);
        assert_eq!(cmd.opts.dims, Some(3));
        assert_eq!(cmd.action.name(), "meet");
    }

    #[test]
    fn meet_reports_the_intersection() {
        let act = Action::Meet {
            a: "x0 >= 0; x0 <= 4".into(),
            b: "x0 >= 2; x1 = 1".into(),
        };
        let r = run(&opts(), &act).unwrap();
        assert_eq!(r.real_dims, 2);
        assert_eq!(r.exact, "true");
        assert_eq!(r.generators.len(), 2);
    }

    #[test]
    fn bound_of_an_expression() {
        let act = Action::Bound {
            system: "x0 >= 0; x1 >= 0; x0 + x1 <= 4".into(),
            expr: "x0 - x1".into(),
        };
        let r = run(&opts(), &act).unwrap();
        assert_eq!(r.bound, Some(BoundReport { inf: Some("-4".into()), sup: Some("4".into()) }));
    }

    #[test]
    fn widening_drops_the_moving_bound() {
        let act = Action::Widen {
            a: "x0 >= 0; x0 <= 1".into(),
            b: "x0 >= 0; x0 <= 2".into(),
            thresholds: None,
        };
        let r = run(&opts(), &act).unwrap();
        assert_eq!(r.constraints, vec!["x0 >= 0".to_string()]);
        let act = Action::Widen {
            a: "x0 >= 0; x0 <= 1".into(),
            b: "x0 >= 0; x0 <= 2".into(),
            thresholds: Some("x0 <= 10".into()),
        };
        let r = run(&opts(), &act).unwrap();
        assert_eq!(r.constraints.len(), 2);
    }

    #[test]
    fn too_few_dimensions_is_an_error() {
        let o = Opts {
            dims: Some(1),
            ..Opts::default()
        };
        let act = Action::Minimize {
            system: "x2 >= 0".into(),
        };
        assert!(run(&o, &act).is_err());
    }

    #[test]
    fn empty_systems_are_reported_as_bottom() {
        let act = Action::Minimize {
            system: "x0 >= 1; x0 <= 0".into(),
        };
        let r = run(&opts(), &act).unwrap();
        assert_eq!(r.bottom, "true");
        assert!(r.generators.is_empty());
    }

    #[test]
    fn report_file_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("r.json");
        let act = Action::Join {
            a: "x0 = 0".into(),
            b: "x0 = 3".into(),
        };
        let r = run(&opts(), &act).unwrap();
        report::write_report(&path, &r).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(v["op"], "join");
        assert_eq!(v["generators"].as_array().map(Vec::len), Some(2));
    }
}
