//! Decoder for ECMA-335 II.23.2 signature blobs.
//!
//! [`SignatureReader`] builds nodes bottom-up into a
//! [`crate::metadata::signatures::SignatureArena`]. Nesting is capped by
//! `max_decode_depth`, truncated input is [`crate::Error::OutOfBounds`] and impossible
//! shapes are [`crate::Error::Malformed`].

use tracing::debug;

use crate::{
    file::parser::Parser,
    metadata::{
        limits::SignatureLimits,
        signatures::{
            CallingConvention, CallingConventionKind, CallingConventionSig, FieldSig,
            GenericInstMethodSig, LocalSig, MethodSig, SigId, SignatureArena,
        },
        typesystem::{CorLibTypes, ELEMENT_TYPE},
    },
    Error::{OutOfBounds, RecursionLimit},
    Result,
};

/// Signature decoder that builds nodes into a [`SignatureArena`]
///
/// Nodes are created bottom-up, a wrapper is pushed after its child. Primitive element
/// types resolve to the shared nodes of the supplied [`CorLibTypes`] instead of allocating.
///
/// # Example
///
/// ```rust
/// use dotsig::metadata::identity::{AssemblyIdentity, AssemblyVersion};
/// use dotsig::metadata::signatures::{SignatureArena, SignatureReader, SignatureTag};
/// use dotsig::metadata::typesystem::{CorLibTypes, TypeRegistry};
///
/// let mut arena = SignatureArena::new();
/// let mut registry = TypeRegistry::new();
/// let corlib = registry.add_assembly(AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0)));
/// let module = registry.add_module("App.dll", None);
/// let types = CorLibTypes::new(&mut arena, &mut registry, module, corlib);
///
/// // int32[]
/// let mut reader = SignatureReader::new(&[0x1D, 0x08], &mut arena, &types);
/// let id = reader.read_type()?.unwrap();
/// assert_eq!(arena.tag(id), Some(SignatureTag::SzArray));
/// assert_eq!(arena.next(id), Some(types.int32()));
/// # Ok::<(), dotsig::Error>(())
/// ```
///
/// ## Notes:
/// - Besides ECMA-335, it's also worth looking at <https://github.com/dotnet/runtime/blob/main/docs/design/coreclr/profiling/davbr-blog-archive/samples/sigparse.cpp>
/// - Create one reader per blob. The entry points in [`crate::metadata::signatures`] do this
///   for you.
pub struct SignatureReader<'a> {
    parser: Parser<'a>,
    arena: &'a mut SignatureArena,
    corlib: &'a CorLibTypes,
    limits: SignatureLimits,
    depth: usize,
}

impl<'a> SignatureReader<'a> {
    /// Create a new `SignatureReader` over a blob
    ///
    /// ## Arguments
    /// * 'data' - The blob to decode
    /// * 'arena' - Arena receiving the decoded nodes
    /// * 'corlib' - Shared primitive nodes, created in the same arena
    #[must_use]
    pub fn new(data: &'a [u8], arena: &'a mut SignatureArena, corlib: &'a CorLibTypes) -> Self {
        SignatureReader {
            parser: Parser::new(data),
            arena,
            corlib,
            limits: SignatureLimits::default(),
            depth: 0,
        }
    }

    /// Set the decoding limits
    #[must_use]
    pub fn with_limits(mut self, limits: SignatureLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Number of bytes consumed so far
    #[must_use]
    pub fn pos(&self) -> usize {
        self.parser.pos()
    }

    /// Decode a single type (II.23.2.12)
    ///
    /// `END` and unknown element types decode as `None`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input,
    /// [`crate::Error::RecursionLimit`] if the type nests deeper than `max_decode_depth`, and
    /// [`crate::Error::Malformed`] for invalid tokens or array shapes.
    pub fn read_type(&mut self) -> Result<Option<SigId>> {
        self.depth += 1;
        if self.depth > self.limits.max_decode_depth {
            return Err(RecursionLimit(self.limits.max_decode_depth));
        }

        let result = self.read_type_inner();
        self.depth -= 1;
        result
    }

    fn read_type_inner(&mut self) -> Result<Option<SigId>> {
        let current_byte = self.parser.read_u8()?;
        if let Some(primitive) = self.corlib.from_element_type(current_byte) {
            return Ok(Some(primitive));
        }

        let id = match current_byte {
            ELEMENT_TYPE::END => return Ok(None),
            ELEMENT_TYPE::PTR => {
                let next = self.read_type()?;
                self.arena.ptr(next)
            }
            ELEMENT_TYPE::BYREF => {
                let next = self.read_type()?;
                self.arena.by_ref(next)
            }
            ELEMENT_TYPE::SZARRAY => {
                let next = self.read_type()?;
                self.arena.sz_array(next)
            }
            ELEMENT_TYPE::PINNED => {
                let next = self.read_type()?;
                self.arena.pinned(next)
            }
            ELEMENT_TYPE::VALUETYPE => {
                let token = self.parser.read_compressed_token()?;
                self.arena.value_type(token)
            }
            ELEMENT_TYPE::CLASS => {
                let token = self.parser.read_compressed_token()?;
                self.arena.class(token)
            }
            ELEMENT_TYPE::VAR => {
                let number = self.parser.read_compressed_uint()?;
                self.arena.var(number)
            }
            ELEMENT_TYPE::MVAR => {
                let number = self.parser.read_compressed_uint()?;
                self.arena.mvar(number)
            }
            ELEMENT_TYPE::ARRAY => self.read_array()?,
            ELEMENT_TYPE::GENERICINST => {
                let generic_type = self.read_type()?;
                let arg_count = self.read_count()?;

                let mut args = Vec::with_capacity(arg_count);
                for _ in 0..arg_count {
                    args.push(self.read_list_element("GENERICINST argument")?);
                }

                self.arena.generic_inst(generic_type, args)
            }
            ELEMENT_TYPE::FNPTR => {
                let method = self.read_method_sig()?;
                self.arena.fn_ptr(CallingConventionSig::Method(method))
            }
            ELEMENT_TYPE::CMOD_REQD => {
                let modifier = self.parser.read_compressed_token()?;
                let next = self.read_type()?;
                self.arena.cmod_reqd(modifier, next)
            }
            ELEMENT_TYPE::CMOD_OPT => {
                let modifier = self.parser.read_compressed_token()?;
                let next = self.read_type()?;
                self.arena.cmod_opt(modifier, next)
            }
            ELEMENT_TYPE::VALUEARRAY => {
                let next = self.read_type()?;
                let size = self.parser.read_compressed_uint()?;
                self.arena.value_array(next, size)
            }
            ELEMENT_TYPE::MODULE => {
                let index = self.parser.read_compressed_uint()?;
                let next = self.read_type()?;
                self.arena.module(index, next)
            }
            ELEMENT_TYPE::SENTINEL => self.arena.sentinel(),
            _ => {
                debug!(
                    element_type = current_byte,
                    offset = self.parser.pos() - 1,
                    "unsupported element type decoded as absent"
                );
                return Ok(None);
            }
        };

        Ok(Some(id))
    }

    /// Decode the shape of a multi-dimensional array (II.23.2.13)
    fn read_array(&mut self) -> Result<SigId> {
        let next = self.read_type()?;

        let rank = self.parser.read_compressed_uint()?;
        if rank > self.limits.max_array_rank {
            return Err(malformed_error!(
                "ARRAY - rank {} exceeds the limit of {}",
                rank,
                self.limits.max_array_rank
            ));
        }

        let num_sizes = self.parser.read_compressed_uint()?;
        if num_sizes > rank {
            return Err(malformed_error!(
                "ARRAY - {} sizes for rank {}",
                num_sizes,
                rank
            ));
        }
        let mut sizes = Vec::with_capacity(num_sizes as usize);
        for _ in 0..num_sizes {
            sizes.push(self.parser.read_compressed_uint()?);
        }

        let num_lo_bounds = self.parser.read_compressed_uint()?;
        if num_lo_bounds > rank {
            return Err(malformed_error!(
                "ARRAY - {} lower bounds for rank {}",
                num_lo_bounds,
                rank
            ));
        }
        let mut lower_bounds = Vec::with_capacity(num_lo_bounds as usize);
        for _ in 0..num_lo_bounds {
            lower_bounds.push(self.parser.read_compressed_int()?);
        }

        Ok(self.arena.array_from_parts(next, rank, sizes, lower_bounds))
    }

    /// Read an element count, rejecting counts the remaining bytes can not hold
    fn read_count(&mut self) -> Result<usize> {
        let count = self.parser.read_compressed_uint()? as usize;
        if count > self.parser.remaining() {
            return Err(OutOfBounds);
        }

        Ok(count)
    }

    /// Read one element of a type list, which must not be absent
    fn read_list_element(&mut self, what: &str) -> Result<SigId> {
        match self.read_type()? {
            Some(id) => Ok(id),
            None => Err(malformed_error!(
                "{} - absent type at offset {}",
                what,
                self.parser.pos()
            )),
        }
    }

    /// Read the calling-convention byte and check it against the accepted kinds
    fn read_calling_convention(
        &mut self,
        what: &str,
        accept: fn(CallingConventionKind) -> bool,
    ) -> Result<CallingConvention> {
        let head_byte = self.parser.read_u8()?;
        let calling_convention = CallingConvention::from_bits_retain(head_byte);

        match calling_convention.kind() {
            Some(kind) if accept(kind) => Ok(calling_convention),
            _ => Err(malformed_error!("{} - invalid start - {}", what, head_byte)),
        }
    }

    /// Decode the return type, the parameters and the vararg tail of a method or property
    fn read_method_body(&mut self, method: &mut MethodSig, param_count: usize) -> Result<()> {
        method.ret_type = self.read_type()?;
        method.params.reserve(param_count);

        let mut decoded = 0;
        while decoded < param_count {
            if self.parser.peek_byte()? == ELEMENT_TYPE::SENTINEL {
                self.parser.advance()?;
                if method.params_after_sentinel.is_some() {
                    return Err(malformed_error!("MethodSig - repeated SENTINEL"));
                }
                method.params_after_sentinel = Some(Vec::new());
                continue;
            }

            let param = self.read_list_element("MethodSig parameter")?;
            match method.params_after_sentinel.as_mut() {
                Some(varargs) => varargs.push(param),
                None => method.params.push(param),
            }
            decoded += 1;
        }

        Ok(())
    }

    /// Decode a method signature - `MethodDefSig`, `MethodRefSig`, `StandAloneMethodSig`
    ///
    /// A `SENTINEL` byte between parameters switches the remaining parameters into
    /// [`MethodSig::params_after_sentinel`]. The sentinel itself is not counted.
    ///
    /// # Errors
    /// Returns an error if the calling convention is not a method kind, an element is
    /// absent, or the blob is truncated.
    pub fn read_method_sig(&mut self) -> Result<MethodSig> {
        let calling_convention =
            self.read_calling_convention("MethodSig", CallingConventionKind::is_method)?;

        let mut method = MethodSig::new(calling_convention, None);
        if calling_convention.is_generic() {
            method.generic_param_count = self.parser.read_compressed_uint()?;
        }

        let param_count = self.read_count()?;
        self.read_method_body(&mut method, param_count)?;

        Ok(method)
    }

    /// Decode a field signature (II.23.2.4)
    ///
    /// # Errors
    /// Returns an error if the signature header is invalid or if the field type cannot be
    /// decoded.
    pub fn read_field_sig(&mut self) -> Result<FieldSig> {
        let calling_convention = self.read_calling_convention("FieldSig", |kind| {
            kind == CallingConventionKind::Field
        })?;

        Ok(FieldSig {
            calling_convention,
            field_type: self.read_type()?,
        })
    }

    /// Decode a property signature (II.23.2.5)
    ///
    /// # Errors
    /// Returns an error if the property signature header is invalid or if a parameter type
    /// cannot be decoded.
    pub fn read_property_sig(&mut self) -> Result<MethodSig> {
        let calling_convention = self.read_calling_convention("PropertySig", |kind| {
            kind == CallingConventionKind::Property
        })?;

        let mut property = MethodSig::new(calling_convention, None);
        let param_count = self.read_count()?;
        self.read_method_body(&mut property, param_count)?;

        Ok(property)
    }

    /// Decode a local variable signature (II.23.2.6)
    ///
    /// Pinned locals decode as a `Pinned` node over the local type.
    ///
    /// # Errors
    /// Returns an error if the header is invalid or if a local type cannot be decoded.
    pub fn read_local_var_sig(&mut self) -> Result<LocalSig> {
        let calling_convention = self.read_calling_convention("LocalSig", |kind| {
            kind == CallingConventionKind::LocalSig
        })?;

        let count = self.read_count()?;
        let mut locals = Vec::with_capacity(count);
        for _ in 0..count {
            locals.push(self.read_list_element("LocalSig local")?);
        }

        Ok(LocalSig {
            calling_convention,
            locals,
        })
    }

    /// Decode a method specification signature (II.23.2.15)
    ///
    /// # Errors
    /// Returns an error if the header is invalid or if a type argument cannot be decoded.
    pub fn read_method_spec_sig(&mut self) -> Result<GenericInstMethodSig> {
        let calling_convention = self.read_calling_convention("MethodSpec", |kind| {
            kind == CallingConventionKind::GenericInst
        })?;

        let count = self.read_count()?;
        let mut generic_arguments = Vec::with_capacity(count);
        for _ in 0..count {
            generic_arguments.push(self.read_list_element("MethodSpec argument")?);
        }

        Ok(GenericInstMethodSig {
            calling_convention,
            generic_arguments,
        })
    }

    /// Decode any standalone signature, dispatching on the calling-convention kind
    ///
    /// # Errors
    /// Returns an error if the kind is reserved (`0x0C..=0x0F`) or the signature is invalid.
    pub fn read_calling_convention_sig(&mut self) -> Result<CallingConventionSig> {
        let head_byte = self.parser.peek_byte()?;

        match CallingConventionKind::from_bits(head_byte) {
            Some(CallingConventionKind::Field) => {
                Ok(CallingConventionSig::Field(self.read_field_sig()?))
            }
            Some(CallingConventionKind::LocalSig) => {
                Ok(CallingConventionSig::LocalVars(self.read_local_var_sig()?))
            }
            Some(CallingConventionKind::Property) => {
                Ok(CallingConventionSig::Property(self.read_property_sig()?))
            }
            Some(CallingConventionKind::GenericInst) => Ok(
                CallingConventionSig::GenericInstMethod(self.read_method_spec_sig()?),
            ),
            Some(_) => Ok(CallingConventionSig::Method(self.read_method_sig()?)),
            None => Err(malformed_error!(
                "CallingConventionSig - reserved kind - {}",
                head_byte
            )),
        }
    }
}
