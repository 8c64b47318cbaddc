use spin::jvm::class_graph::{ClassGraph, ClassGraphArenas, MethodId};
use spin::jvm::{self, BaseType, FieldType, Name, RenderDescriptor, RenderFlags};
use spin::runtime::{self, narrow_int, Fault, Value, Vm};
use spin::specimens::{self, Specimens};

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fmt;
use std::process;

/// Errors that stop the binary before a specimen runs
enum CliError {
    Jvm(jvm::Error),
    UnknownMethod(String),
    BadArgument(String),
}

impl From<jvm::Error> for CliError {
    fn from(err: jvm::Error) -> CliError {
        CliError::Jvm(err)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Jvm(err) => write!(f, "{}", err),
            CliError::UnknownMethod(name) => write!(f, "No specimen named '{}'", name),
            CliError::BadArgument(msg) => write!(f, "Bad argument: {}", msg),
        }
    }
}

fn main() -> Result<(), CliError> {
    env_logger::init();

    let matches = Command::new("JVM compilation specimens")
        .version(clap::crate_version!())
        .author("Alec Theriault <alec.theriault@gmail.com>")
        .about("List and run the methods of the Spin specimen class")
        .subcommand_required(true)
        .arg(
            Arg::new("host-class")
                .long("host-class")
                .value_name("CLASS_NAME")
                .global(true)
                .default_value("Spin")
                .help("Name of the host class (eg. `me/alec/Spin`)"),
        )
        .subcommand(Command::new("list").about("Print every specimen and how it is declared"))
        .subcommand(
            Command::new("run")
                .about("Invoke one specimen and print its result")
                .arg(
                    Arg::new("METHOD")
                        .help("Specimen to run (eg. `Spin.addTwo` or `Spin$Near.getItNear`)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("ARGS")
                        .help("Arguments, parsed according to the method descriptor")
                        .num_args(0..)
                        .allow_negative_numbers(true)
                        .index(2),
                )
                .arg(
                    Arg::new("trace-invocations")
                        .long("trace-invocations")
                        .action(ArgAction::SetTrue)
                        .help("Print every method invoked, after dispatch"),
                ),
        )
        .get_matches();

    let host_class = matches
        .get_one::<String>("host-class")
        .cloned()
        .unwrap_or_else(|| String::from("Spin"));
    let settings = specimens::Settings::new(host_class)?;

    let class_graph_arenas = ClassGraphArenas::new();
    let class_graph = ClassGraph::new(&class_graph_arenas);
    let java = class_graph.insert_java_library_types();
    let spin = Specimens::add_to_graph(&class_graph, &java, &settings)?;

    match matches.subcommand() {
        Some(("run", run_matches)) => run(&spin, run_matches),
        _ => list(&spin),
    }
}

/// Print the catalogue, class-dump style
fn list(spin: &Specimens) -> Result<(), CliError> {
    let vm = Vm::link(&spin.java, spin.classes()?, runtime::Settings::default())?;

    for (index, (feature, method)) in spin.catalogue().into_iter().enumerate() {
        println!(
            "#{}: {}.{} [Type:{}]",
            index,
            method.class.name.as_str(),
            method.name.as_str(),
            method.descriptor.render()
        );
        println!("  feature: {}", feature);
        println!(
            "  access_flags: 0x{:04x} {}",
            method.access_flags.bits(),
            method.access_flags.render_names()
        );
        if let Some(max_locals) = vm.max_locals(method) {
            println!("  max_locals: {}", max_locals);
        }
        let exceptions = vm.exceptions(method);
        if !exceptions.is_empty() {
            let names: Vec<&str> = exceptions.iter().map(|class| class.name.as_str()).collect();
            println!("  exceptions: {}", names.join(", "));
        }
        if let Some(switch) = spin.switch(method)? {
            for line in switch.to_string().lines() {
                println!("  {}", line);
            }
        }
    }

    Ok(())
}

/// Run one specimen on a fresh receiver
fn run<'g>(spin: &Specimens<'g>, matches: &ArgMatches) -> Result<(), CliError> {
    let trace = matches.get_flag("trace-invocations");
    let vm = Vm::link(
        &spin.java,
        spin.classes()?,
        runtime::Settings {
            record_invocations: trace,
        },
    )?;

    let target = matches
        .get_one::<String>("METHOD")
        .map(String::as_str)
        .unwrap_or_default();
    let method = find_method(spin, target)?;
    let arguments: Vec<&str> = matches
        .get_many::<String>("ARGS")
        .map(|args| args.map(String::as_str).collect())
        .unwrap_or_default();
    let mut arguments = parse_arguments(method, &arguments)?;
    log::info!("Running {:?} with {:?}", method, arguments);

    let completion = if method.is_static() {
        vm.call(method, arguments)
    } else {
        spin.new_receiver(&vm, method.class).and_then(|receiver| {
            arguments.insert(0, Value::from(receiver));
            vm.call(method, arguments)
        })
    };

    if trace {
        for (depth, invoked) in vm.journal().into_iter().enumerate() {
            println!("  [{}] {:?}", depth, invoked);
        }
    }

    match completion {
        Ok(Some(value)) => println!("{}", vm.describe(&value)),
        Ok(None) => println!("(void)"),
        Err(fault) => {
            report_fault(&vm, &fault);
            process::exit(1);
        }
    }

    Ok(())
}

/// Find a declared method from `CLASS.METHOD`
fn find_method<'g>(spin: &Specimens<'g>, target: &str) -> Result<MethodId<'g>, CliError> {
    let (class_name, method_name) = target
        .rsplit_once('.')
        .ok_or_else(|| CliError::UnknownMethod(target.to_owned()))?;
    let class = spin
        .class_named(class_name)
        .ok_or_else(|| CliError::UnknownMethod(target.to_owned()))?;
    let mut methods = class.declared_methods_named(method_name);
    match methods.pop() {
        Some(method) if methods.is_empty() => Ok(method),
        _ => Err(CliError::UnknownMethod(target.to_owned())),
    }
}

/// Parse command line arguments according to the method descriptor
fn parse_arguments<'g>(
    method: MethodId<'g>,
    arguments: &[&str],
) -> Result<Vec<Value<'g>>, CliError> {
    let parameters = &method.descriptor.parameters;
    if parameters.len() != arguments.len() {
        return Err(CliError::BadArgument(format!(
            "{:?} takes {} arguments but {} were given",
            method,
            parameters.len(),
            arguments.len()
        )));
    }

    parameters
        .iter()
        .zip(arguments)
        .map(|(parameter, argument)| parse_argument(parameter, argument))
        .collect()
}

fn parse_argument<'g, C>(parameter: &FieldType<C>, argument: &str) -> Result<Value<'g>, CliError> {
    let bad = || CliError::BadArgument(format!("cannot parse '{}'", argument));
    let value = match parameter {
        FieldType::Base(BaseType::Long) => Value::Long(argument.parse().map_err(|_| bad())?),
        FieldType::Base(BaseType::Float) => Value::Float(argument.parse().map_err(|_| bad())?),
        FieldType::Base(BaseType::Double) => Value::Double(argument.parse().map_err(|_| bad())?),
        FieldType::Base(base_type) => {
            let int: i32 = argument.parse().map_err(|_| bad())?;
            Value::Int(narrow_int(*base_type, int))
        }
        FieldType::Ref(_) if argument == "null" => Value::NULL,
        FieldType::Ref(_) => {
            return Err(CliError::BadArgument(format!(
                "only `null` can be passed for references, not '{}'",
                argument
            )))
        }
    };
    Ok(value)
}

fn report_fault<'g>(vm: &Vm<'g>, fault: &Fault<'g>) {
    let kind = vm.fault_kind(fault);
    log::error!("Uncaught fault: {}", fault);
    eprintln!(
        "Exception in thread \"main\" {}",
        kind.name.as_str().replace('/', ".")
    );
}
