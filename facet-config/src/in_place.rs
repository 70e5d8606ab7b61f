//! Writing resolved values straight into a value the caller already owns.
#![allow(unsafe_code)]

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use facet_core::{Def, Facet, Field, PtrMut, Shape, Type, UserType};

use crate::schema::boxed_record;
use crate::{ConfigError, ConfigErrorKind, ConfigPath};

struct Frame<'mem> {
    ptr: PtrMut<'mem>,
    shape: &'static Shape<'static>,
}

/// A cursor over a mutably borrowed struct.
///
/// Fields are looked up by name on the shape of the record the cursor is on,
/// and their type is checked before anything is read or written through them.
pub(crate) struct InPlace<'mem> {
    frames: Vec<Frame<'mem>>,
}

impl<'mem> InPlace<'mem> {
    pub(crate) fn new<T: Facet<'static>>(target: &'mem mut T) -> Self {
        Self {
            frames: alloc::vec![Frame {
                ptr: PtrMut::new(target as *mut T),
                shape: T::SHAPE,
            }],
        }
    }

    /// Points at field `name` of the current record.
    fn field(
        &self,
        name: &str,
        path: &ConfigPath,
    ) -> Result<(PtrMut<'mem>, &'static Field<'static>), ConfigError> {
        let Some(frame) = self.frames.last() else {
            return Err(mismatch(format!("no record is open for '{name}'"), path));
        };
        let shape = frame.shape;
        let Type::User(UserType::Struct(st)) = &shape.ty else {
            return Err(mismatch(format!("'{shape}' is not a struct"), path));
        };
        let Some(field) = st.fields.iter().find(|field| field.name == name) else {
            return Err(mismatch(format!("'{shape}' has no field '{name}'"), path));
        };
        // SAFETY: `field` is declared on the struct `frame.ptr` points at, so
        // its offset stays inside that value.
        let ptr = PtrMut::new(unsafe { frame.ptr.as_mut_byte_ptr().add(field.offset) });
        Ok((ptr, field))
    }

    /// Overwrites the `String` field `name`, dropping its old value.
    pub(crate) fn set_string(
        &mut self,
        name: &str,
        value: String,
        path: &ConfigPath,
    ) -> Result<(), ConfigError> {
        let (ptr, field) = self.field(name, path)?;
        if !field.shape().is_type::<String>() {
            return Err(mismatch(
                format!("field '{name}' is a '{}', not a String", field.shape()),
                path,
            ));
        }
        // SAFETY: the field was just checked to hold an initialized `String`.
        unsafe { ptr.replace(value) };
        Ok(())
    }

    /// Moves onto the struct stored inline in field `name`.
    pub(crate) fn enter_record(&mut self, name: &str, path: &ConfigPath) -> Result<(), ConfigError> {
        let (ptr, field) = self.field(name, path)?;
        let shape = field.shape();
        if !matches!(shape.ty, Type::User(UserType::Struct(_))) {
            return Err(mismatch(format!("field '{name}' is not a struct"), path));
        }
        self.frames.push(Frame { ptr, shape });
        Ok(())
    }

    /// Moves onto the struct owned by the `Box` in field `name`.
    ///
    /// A `Box` is never empty, so the record it owns is reused as is.
    pub(crate) fn enter_box(&mut self, name: &str, path: &ConfigPath) -> Result<(), ConfigError> {
        let (ptr, field) = self.field(name, path)?;
        let shape = field.shape();
        let (Some(pointee), Def::SmartPointer(def)) = (boxed_record(shape), shape.def) else {
            return Err(mismatch(format!("field '{name}' is not a boxed struct"), path));
        };
        let Some(borrow_fn) = def.vtable.borrow_fn else {
            return Err(mismatch(format!("'{shape}' cannot be borrowed"), path));
        };
        // SAFETY: `ptr` points at an initialized `Box` of `pointee`, which is
        // what its own vtable expects.
        let inner = unsafe { borrow_fn(ptr.as_const()) };
        self.frames.push(Frame {
            ptr: PtrMut::new(inner.as_byte_ptr() as *mut u8),
            shape: pointee,
        });
        Ok(())
    }

    /// Moves back to the record that owns the current one.
    pub(crate) fn leave(&mut self) {
        self.frames.pop();
    }
}

fn mismatch(message: String, path: &ConfigPath) -> ConfigError {
    ConfigError::new(ConfigErrorKind::Reflect(message), path.clone())
}
