//! Signature encoder for .NET metadata blobs.
//!
//! [`SignatureWriter`] is the inverse of [`crate::metadata::signatures::SignatureReader`]:
//! it walks nodes of a [`SignatureArena`] and writes the ECMA-335 II.23.2 grammar back,
//! bit for bit. Absent children (and ids that do not resolve) are written as `END` (0x00),
//! which the reader decodes as an absent node again.
//!
//! # Encoded Forms
//!
//! - Type signatures, including every wrapper and array shape
//! - Method, property, field, local variable and method instantiation signatures
//! - Tokens as TypeDefOrRef coded indices (TypeDef, TypeRef and TypeSpec only)

use crate::{
    metadata::{
        limits::SignatureLimits,
        signatures::{
            CallingConventionSig, FieldSig, GenericInstMethodSig, LocalSig, MethodSig, SigId,
            SignatureArena, TypeSig,
        },
        typesystem::ELEMENT_TYPE,
    },
    utils::{write_compressed_int, write_compressed_token, write_compressed_uint},
    Error, Result,
};

/// Encoder of signature nodes into a byte buffer
///
/// # Example
///
/// ```rust
/// use dotsig::metadata::signatures::{SignatureArena, SignatureWriter};
///
/// let mut arena = SignatureArena::new();
/// let var = arena.var(1);
/// let array = arena.sz_array(var);
///
/// let mut writer = SignatureWriter::new(&arena);
/// writer.write_type(Some(array))?;
/// assert_eq!(writer.into_bytes(), vec![0x1D, 0x13, 0x01]);
/// # Ok::<(), dotsig::Error>(())
/// ```
pub struct SignatureWriter<'a> {
    arena: &'a SignatureArena,
    limits: SignatureLimits,
    buffer: Vec<u8>,
    depth: usize,
}

impl<'a> SignatureWriter<'a> {
    /// Create a writer over the nodes of `arena`
    #[must_use]
    pub fn new(arena: &'a SignatureArena) -> Self {
        SignatureWriter {
            arena,
            limits: SignatureLimits::default(),
            buffer: Vec::new(),
            depth: 0,
        }
    }

    /// Set the encoding limits, `max_decode_depth` bounds the nesting of written types
    #[must_use]
    pub fn with_limits(mut self, limits: SignatureLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The bytes written so far
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer and return the encoded blob
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Encode a single type (II.23.2.12)
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for tokens outside TypeDef, TypeRef and
    /// TypeSpec, [`crate::Error::InvalidSignature`] for array shapes or function pointers
    /// the grammar can not express, and [`crate::Error::RecursionLimit`] for types nested
    /// deeper than `max_decode_depth`.
    pub fn write_type(&mut self, id: Option<SigId>) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limits.max_decode_depth {
            return Err(Error::RecursionLimit(self.limits.max_decode_depth));
        }

        let result = self.write_type_inner(id);
        self.depth -= 1;
        result
    }

    fn write_type_inner(&mut self, id: Option<SigId>) -> Result<()> {
        let arena = self.arena;
        let Some(sig) = id.and_then(|id| arena.get(id)) else {
            self.buffer.push(ELEMENT_TYPE::END);
            return Ok(());
        };

        self.buffer.push(sig.element_type());
        match sig {
            TypeSig::Class(sig) | TypeSig::ValueType(sig) => {
                write_compressed_token(sig.token(), &mut self.buffer)
            }
            TypeSig::CorLib(_) | TypeSig::Sentinel => Ok(()),
            TypeSig::Var(sig) | TypeSig::MVar(sig) => {
                write_compressed_uint(sig.number(), &mut self.buffer)
            }
            TypeSig::FnPtr(sig) => match sig.signature() {
                CallingConventionSig::Method(method) => self.write_method_sig(method),
                other => Err(Error::InvalidSignature(format!(
                    "FNPTR - function pointer must hold a method signature, found {:?}",
                    other.calling_convention()
                ))),
            },
            TypeSig::GenericInst(sig) => {
                self.write_type(sig.generic_type())?;
                self.write_count(sig.arg_count())?;
                sig.generic_arguments()
                    .iter()
                    .try_for_each(|arg| self.write_type(Some(*arg)))
            }
            TypeSig::Ptr(sig) | TypeSig::ByRef(sig) | TypeSig::SzArray(sig) | TypeSig::Pinned(sig) => {
                self.write_type(sig.next())
            }
            TypeSig::Array(sig) => {
                if sig.sizes().len() > sig.rank() as usize
                    || sig.lower_bounds().len() > sig.rank() as usize
                {
                    return Err(Error::InvalidSignature(format!(
                        "ARRAY - {} sizes and {} lower bounds do not fit rank {}",
                        sig.sizes().len(),
                        sig.lower_bounds().len(),
                        sig.rank()
                    )));
                }

                self.write_type(sig.next())?;
                write_compressed_uint(sig.rank(), &mut self.buffer)?;
                self.write_count(sig.sizes().len())?;
                for size in sig.sizes() {
                    write_compressed_uint(*size, &mut self.buffer)?;
                }
                self.write_count(sig.lower_bounds().len())?;
                for bound in sig.lower_bounds() {
                    write_compressed_int(*bound, &mut self.buffer)?;
                }
                Ok(())
            }
            TypeSig::CModReqd(sig) | TypeSig::CModOpt(sig) => {
                write_compressed_token(sig.modifier(), &mut self.buffer)?;
                self.write_type(sig.next())
            }
            TypeSig::ValueArray(sig) => {
                self.write_type(sig.next())?;
                write_compressed_uint(sig.size(), &mut self.buffer)
            }
            TypeSig::Module(sig) => {
                write_compressed_uint(sig.index(), &mut self.buffer)?;
                self.write_type(sig.next())
            }
        }
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| Error::InvalidSignature(format!("count {count} is too large")))?;
        write_compressed_uint(count, &mut self.buffer)
    }

    fn write_list(&mut self, list: &[SigId]) -> Result<()> {
        self.write_count(list.len())?;
        list.iter().try_for_each(|id| self.write_type(Some(*id)))
    }

    /// Encode the parameters of a method or property, with a `SENTINEL` before the vararg
    /// tail when one is present
    fn write_method_body(&mut self, method: &MethodSig) -> Result<()> {
        self.write_count(method.param_count())?;
        self.write_type(method.ret_type)?;
        for param in &method.params {
            self.write_type(Some(*param))?;
        }

        if let Some(varargs) = &method.params_after_sentinel {
            self.buffer.push(ELEMENT_TYPE::SENTINEL);
            for param in varargs {
                self.write_type(Some(*param))?;
            }
        }

        Ok(())
    }

    /// Encode a method signature (II.23.2.1 - II.23.2.3)
    ///
    /// # Errors
    /// Returns an error if a parameter type can not be encoded.
    pub fn write_method_sig(&mut self, method: &MethodSig) -> Result<()> {
        self.buffer.push(method.calling_convention.bits());
        if method.calling_convention.is_generic() {
            write_compressed_uint(method.generic_param_count, &mut self.buffer)?;
        }

        self.write_method_body(method)
    }

    /// Encode a property signature (II.23.2.5)
    ///
    /// # Errors
    /// Returns an error if a parameter type can not be encoded.
    pub fn write_property_sig(&mut self, property: &MethodSig) -> Result<()> {
        self.buffer.push(property.calling_convention.bits());
        self.write_method_body(property)
    }

    /// Encode a field signature (II.23.2.4)
    ///
    /// # Errors
    /// Returns an error if the field type can not be encoded.
    pub fn write_field_sig(&mut self, field: &FieldSig) -> Result<()> {
        self.buffer.push(field.calling_convention.bits());
        self.write_type(field.field_type)
    }

    /// Encode a local variable signature (II.23.2.6)
    ///
    /// # Errors
    /// Returns an error if a local type can not be encoded.
    pub fn write_local_var_sig(&mut self, locals: &LocalSig) -> Result<()> {
        self.buffer.push(locals.calling_convention.bits());
        self.write_list(&locals.locals)
    }

    /// Encode a method specification signature (II.23.2.15)
    ///
    /// # Errors
    /// Returns an error if a type argument can not be encoded.
    pub fn write_method_spec_sig(&mut self, spec: &GenericInstMethodSig) -> Result<()> {
        self.buffer.push(spec.calling_convention.bits());
        self.write_list(&spec.generic_arguments)
    }

    /// Encode any standalone signature
    ///
    /// # Errors
    /// Returns an error if a referenced type can not be encoded.
    pub fn write_calling_convention_sig(&mut self, signature: &CallingConventionSig) -> Result<()> {
        match signature {
            CallingConventionSig::Method(method) => self.write_method_sig(method),
            CallingConventionSig::Property(property) => self.write_property_sig(property),
            CallingConventionSig::Field(field) => self.write_field_sig(field),
            CallingConventionSig::LocalVars(locals) => self.write_local_var_sig(locals),
            CallingConventionSig::GenericInstMethod(spec) => self.write_method_spec_sig(spec),
        }
    }
}
