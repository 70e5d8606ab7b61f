use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use facet_core::{Characteristic, Facet, Field, Shape};
use facet_reflect::Partial;
use log::{debug, trace};
use owo_colors::OwoColorize;

use crate::in_place::InPlace;
use crate::schema::{self, FieldDescriptor, FieldKind, boxed_record, schema_type_error};
use crate::{ConfigError, ConfigErrorKind, ConfigPath, Provider, ProviderChain};

const SECRET_MASK: &str = "******";

macro_rules! reflect {
    ($partial:expr, $path:expr, $($tt:tt)*) => {
        if let Err(e) = $partial.$($tt)* {
            return Err(ConfigError::reflect(e, $path));
        }
    };
}

/// One entry of the work-list.
enum Step<'shape> {
    /// A field that still has to be expanded or resolved
    Visit(FieldDescriptor<'shape>),
    /// All children of a nested record are done: leave it
    Close { boxed: bool, path: ConfigPath },
}

/// Where resolved values are written while the work-list is drained.
pub(crate) trait Sink<'shape> {
    /// Handles a `config_skip` field of the current record.
    fn skip(&mut self, field: &'shape Field<'shape>, path: &ConfigPath) -> Result<(), ConfigError>;

    /// Stores a resolved leaf in field `name` of the current record.
    fn store(&mut self, name: &'shape str, value: String, path: &ConfigPath)
    -> Result<(), ConfigError>;

    /// Moves onto the record held by field `name`, inline or in a `Box`.
    fn open(&mut self, name: &'shape str, boxed: bool, path: &ConfigPath)
    -> Result<(), ConfigError>;

    /// Moves back out of the record entered last.
    fn close(&mut self, boxed: bool, path: &ConfigPath) -> Result<(), ConfigError>;
}

/// Builds a fresh value. Skipped fields get their type's `Default`.
impl<'facet, 'shape> Sink<'shape> for Partial<'facet, 'shape> {
    fn skip(&mut self, field: &'shape Field<'shape>, path: &ConfigPath) -> Result<(), ConfigError> {
        if !field.shape().is(Characteristic::Default) {
            return Err(ConfigError::new(
                ConfigErrorKind::Reflect(format!(
                    "field '{}' is skipped but '{}' does not implement Default",
                    field.name,
                    field.shape()
                )),
                path.clone(),
            ));
        }
        reflect!(self, path, begin_field(field.name));
        reflect!(self, path, set_default());
        reflect!(self, path, end());
        Ok(())
    }

    fn store(&mut self, name: &'shape str, value: String, path: &ConfigPath) -> Result<(), ConfigError> {
        reflect!(self, path, begin_field(name));
        reflect!(self, path, set(value));
        reflect!(self, path, end());
        Ok(())
    }

    fn open(&mut self, name: &'shape str, boxed: bool, path: &ConfigPath) -> Result<(), ConfigError> {
        reflect!(self, path, begin_field(name));
        if boxed {
            reflect!(self, path, begin_smart_ptr());
        }
        Ok(())
    }

    fn close(&mut self, boxed: bool, path: &ConfigPath) -> Result<(), ConfigError> {
        reflect!(self, path, end());
        if boxed {
            reflect!(self, path, end());
        }
        Ok(())
    }
}

/// Writes into an existing value. Skipped fields are left alone.
impl<'mem> Sink<'static> for InPlace<'mem> {
    fn skip(&mut self, _field: &'static Field<'static>, _path: &ConfigPath) -> Result<(), ConfigError> {
        Ok(())
    }

    fn store(&mut self, name: &'static str, value: String, path: &ConfigPath) -> Result<(), ConfigError> {
        self.set_string(name, value, path)
    }

    fn open(&mut self, name: &'static str, boxed: bool, path: &ConfigPath) -> Result<(), ConfigError> {
        if boxed {
            self.enter_box(name, path)
        } else {
            self.enter_record(name, path)
        }
    }

    fn close(&mut self, _boxed: bool, _path: &ConfigPath) -> Result<(), ConfigError> {
        self.leave();
        Ok(())
    }
}

/// Populates facet structs from an ordered chain of providers.
///
/// ```
/// use facet::Facet;
/// use facet_config::{Configurator, EnvProvider};
///
/// #[derive(Facet)]
/// struct Database {
///     url: String,
/// }
///
/// #[derive(Facet)]
/// struct Config {
///     #[facet(path = "db")]
///     database: Box<Database>,
/// }
///
/// let config: Config = Configurator::new()
///     .with_provider(EnvProvider::from_vars([("DB_URL", "postgres://localhost")]))
///     .load()
///     .unwrap();
/// assert_eq!(config.database.url, "postgres://localhost");
/// ```
#[derive(Default)]
pub struct Configurator<'p> {
    chain: ProviderChain<'p>,
}

impl<'p> Configurator<'p> {
    /// A configurator without providers: every field resolves to its fallback
    /// or to an empty string.
    pub fn new() -> Self {
        Self {
            chain: ProviderChain::new(),
        }
    }

    /// Registers a provider, builder-style. Providers registered later take
    /// precedence over earlier ones.
    pub fn with_provider(mut self, provider: impl Provider + 'p) -> Self {
        self.chain.push(provider);
        self
    }

    /// Registers a provider. Providers registered later take precedence over
    /// earlier ones.
    pub fn register(&mut self, provider: impl Provider + 'p) -> &mut Self {
        self.chain.push(provider);
        self
    }

    /// Names of the registered providers, in registration order.
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.chain.names()
    }

    /// Builds a `T` with every leaf resolved through the providers.
    ///
    /// Fields marked `config_skip` are filled from their type's `Default`.
    pub fn load<T: Facet<'static>>(&self) -> Result<T, ConfigError> {
        let root = ConfigPath::root();
        let mut partial =
            Partial::alloc_shape(T::SHAPE).map_err(|e| ConfigError::reflect(e, &root))?;
        self.fill(&mut partial, T::SHAPE)?;
        let heap_value = partial.build().map_err(|e| ConfigError::reflect(e, &root))?;
        heap_value
            .materialize::<T>()
            .map_err(|e| ConfigError::reflect(e, &root))
    }

    /// Populates `target` in place: every reachable `String` leaf gets its
    /// resolved value, and the records held by reachable boxes are reused.
    ///
    /// Fields marked `config_skip` are never touched. Population is not
    /// transactional: on error, leaves written before the failing one keep
    /// their new values and the rest keep their old ones.
    pub fn populate<T: Facet<'static>>(&self, target: &mut T) -> Result<(), ConfigError> {
        self.fill(&mut InPlace::new(target), T::SHAPE)
    }

    /// Paths of every leaf [`load`](Self::load) would resolve for `T`, in
    /// visiting order. No provider is queried.
    pub fn paths<T: Facet<'static>>() -> Result<Vec<ConfigPath>, ConfigError> {
        schema::leaf_paths(T::SHAPE)
    }

    /// Drives the work-list until every field of `root` has been visited.
    fn fill<'shape, S: Sink<'shape>>(
        &self,
        sink: &mut S,
        root: &'shape Shape<'shape>,
    ) -> Result<(), ConfigError> {
        trace!("Populating {}", root.blue());

        let mut stack = Vec::new();
        self.expand(sink, root, &ConfigPath::root(), &mut stack)?;

        while let Some(step) = stack.pop() {
            match step {
                Step::Close { boxed, path } => {
                    trace!("Leaving {}", path.yellow());
                    sink.close(boxed, &path)?;
                }
                Step::Visit(descriptor) => self.visit(sink, descriptor, &mut stack)?,
            }
        }

        debug!("Populated {}", root.blue());
        Ok(())
    }

    /// Queues the fields of the record the sink is currently on.
    fn expand<'shape, S: Sink<'shape>>(
        &self,
        sink: &mut S,
        record: &'shape Shape<'shape>,
        path: &ConfigPath,
        stack: &mut Vec<Step<'shape>>,
    ) -> Result<(), ConfigError> {
        let descriptors = schema::enumerate(record, path)?;

        for field in schema::skipped_fields(record) {
            let field_path = path.join(&[field.name]);
            trace!("Skipping {}", field_path.yellow());
            sink.skip(field, &field_path)?;
        }

        // Reversed so that fields are visited in declaration order.
        stack.extend(descriptors.into_iter().rev().map(Step::Visit));
        Ok(())
    }

    fn visit<'shape, S: Sink<'shape>>(
        &self,
        sink: &mut S,
        descriptor: FieldDescriptor<'shape>,
        stack: &mut Vec<Step<'shape>>,
    ) -> Result<(), ConfigError> {
        let path = &descriptor.path;
        let name = descriptor.node.name();

        match descriptor.node.kind() {
            FieldKind::Unsupported => Err(schema_type_error(&descriptor)),
            FieldKind::Scalar => {
                let value = self.resolve(&descriptor)?;
                sink.store(name, value, path)
            }
            FieldKind::Record => {
                trace!("Expanding {} into {}", path.yellow(), descriptor.node.shape().blue());
                sink.open(name, false, path)?;
                stack.push(Step::Close {
                    boxed: false,
                    path: path.clone(),
                });
                self.expand(sink, descriptor.node.shape(), path, stack)
            }
            FieldKind::BoxedRecord => {
                let record = boxed_record(descriptor.node.shape())
                    .ok_or_else(|| schema_type_error(&descriptor))?;
                trace!("Opening {} for {}", record.blue(), path.yellow());
                sink.open(name, true, path)?;
                stack.push(Step::Close {
                    boxed: true,
                    path: path.clone(),
                });
                self.expand(sink, record, path, stack)
            }
        }
    }

    /// Resolves a scalar leaf: providers first, then the declared fallback.
    fn resolve(&self, descriptor: &FieldDescriptor<'_>) -> Result<String, ConfigError> {
        let node = &descriptor.node;
        let mut value = self.chain.resolve(&descriptor.path)?;

        if value.is_empty() {
            if let Some(fallback) = node.fallback {
                trace!("Falling back for {}", descriptor.path.yellow());
                value = fallback.to_string();
            }
        }

        if value.is_empty() && node.required {
            return Err(ConfigError::new(
                ConfigErrorKind::MissingSource {
                    field: node.name().to_string(),
                },
                descriptor.path.clone(),
            ));
        }

        let shown = if node.sensitive { SECRET_MASK } else { value.as_str() };
        trace!("{} = {:?}", descriptor.path.yellow(), shown);
        Ok(value)
    }
}
