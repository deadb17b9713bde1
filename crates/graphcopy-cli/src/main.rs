use std::{env, error::Error, fs, process::ExitCode, time::Instant};

use graphcopy::{
    ClassBuilder, DeepCopier, Heap, LimitedTracker, NoLimitTracker, ResourceLimits, ResourceTracker,
    StderrTracer, Value, ValueType,
};

const USAGE: &str = "usage: graphcopy [--json] [--trace] [--limits <limits.json>]";

#[derive(Debug, Default)]
struct Options {
    json: bool,
    trace: bool,
    limits: Option<String>,
}

fn main() -> ExitCode {
    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: {err}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let result = match &options.limits {
        Some(path) => match read_limits(path) {
            Ok(limits) => run(Heap::new(16, LimitedTracker::new(limits)), &options),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => run(Heap::new(16, NoLimitTracker), &options),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = args.peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--trace" => options.trace = true,
            "--limits" => options.limits = Some(args.next().ok_or("--limits needs a file path")?),
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(options)
}

fn read_limits(path: &str) -> Result<ResourceLimits, String> {
    let text = fs::read_to_string(path).map_err(|err| format!("reading {path}: {err}"))?;
    serde_json::from_str(&text).map_err(|err| format!("parsing {path}: {err}"))
}

/// Copies a person with a list of books, then changes the copy and shows that
/// the original is unaffected.
fn run<T: ResourceTracker>(mut heap: Heap<T>, options: &Options) -> Result<(), Box<dyn Error>> {
    let person = heap
        .register_class(
            ClassBuilder::new("Person")
                .field("name", ValueType::Str)
                .field("age", ValueType::Int)
                .field("books", ValueType::Object),
        )?;
    let books = heap.new_list(["Book1", "Book2", "Book3"].map(Value::str))?;
    let original = heap.new_record(person, vec![Value::str("John Doe"), Value::Int(30), books])?;

    let start = Instant::now();
    let copy = if options.trace {
        let mut copier = DeepCopier::with_tracer(&mut heap, StderrTracer::new());
        let copy = copier.copy(&original)?;
        eprintln!("{:?}", copier.finish());
        copy
    } else {
        heap.deep_copy(&original)?
    };
    let elapsed = start.elapsed();
    eprintln!("deep copy took {elapsed:?}");

    show(&heap, options, "Original", &original);
    show(&heap, options, "Copy", &copy);

    heap.set_field(&copy, "name", Value::str("Jane Doe"))?;
    let books = heap.field(&copy, "books")?.clone();
    if let Some(list) = heap.as_list_mut(&books) {
        list.push(Value::str("Book4"));
    }
    println!();
    println!("After modifying the copy:");
    show(&heap, options, "Original", &original);
    show(&heap, options, "Copy", &copy);
    Ok(())
}

fn show<T: ResourceTracker>(heap: &Heap<T>, options: &Options, label: &str, value: &Value) {
    let object = heap.to_object(value);
    if options.json {
        println!("{label}: {}", object.to_json_value());
    } else {
        println!("{label}: {object}");
    }
}
