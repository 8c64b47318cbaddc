//! Array allocation, default values, and element access

use super::{body, int, Specimens};
use crate::jvm::model::Method;
use crate::jvm::{ArrayType, BaseType, Error, FieldType, LocalsLayout, RefType};
use crate::runtime::Value;

pub(super) fn methods<'g>(specimens: &Specimens<'g>) -> Result<Vec<Method<'g>>, Error> {
    let spin = specimens.members.spin;
    let thread = specimens.java.classes.lang.thread;
    let mut methods = vec![];

    // void createBuffer() {
    //   int buffer[]; int bufsz = 100; int value = 12;
    //   buffer = new int[bufsz]; buffer[10] = value; value = buffer[11];
    // }
    let mut locals = LocalsLayout::for_method(&spin.create_buffer)?;
    let buffer = locals.declare(FieldType::Ref(RefType::array(FieldType::int())))?;
    let bufsz = locals.declare(FieldType::int())?;
    let value = locals.declare(FieldType::int())?;
    methods.push(
        Method::with_body(
            spin.create_buffer,
            body(move |vm, frame| {
                frame.istore(bufsz, 100)?;
                frame.istore(value, 12)?;
                let array = vm.new_array(FieldType::int(), frame.iload(bufsz)?)?;
                frame.astore(buffer, Value::from(array))?;
                vm.array_store(&frame.aload(buffer)?, 10, Value::Int(frame.iload(value)?))?;
                let loaded = int(vm.array_load(&frame.aload(buffer)?, 11)?)?;
                frame.istore(value, loaded)?;
                Ok(None)
            }),
        )
        .with_locals(locals),
    );

    // void createThreadArray() {
    //   Thread threads[]; int count = 10;
    //   threads = new Thread[count]; threads[0] = new Thread();
    // }
    let mut locals = LocalsLayout::for_method(&spin.create_thread_array)?;
    let threads = locals.declare(FieldType::Ref(RefType::array(FieldType::object(thread))))?;
    let count = locals.declare(FieldType::int())?;
    methods.push(
        Method::with_body(
            spin.create_thread_array,
            body(move |vm, frame| {
                frame.istore(count, 10)?;
                let array = vm.new_array(FieldType::object(thread), frame.iload(count)?)?;
                frame.astore(threads, Value::from(array))?;
                let first = Value::from(vm.new_thread()?);
                vm.array_store(&frame.aload(threads)?, 0, first)?;
                Ok(None)
            }),
        )
        .with_locals(locals),
    );

    // int[][][][] create3DArray() { int grid[][][][]; grid = new int[10][5][6][]; return grid; }
    let grid_type: RefType<_> = RefType::PrimitiveArray(ArrayType {
        additional_dimensions: 3,
        element_type: BaseType::Int,
    });
    let mut locals = LocalsLayout::for_method(&spin.create3_d_array)?;
    let grid = locals.declare(FieldType::Ref(grid_type))?;
    methods.push(
        Method::with_body(
            spin.create3_d_array,
            body(move |vm, frame| {
                let array = vm.new_multi_array(&grid_type, &[10, 5, 6])?;
                frame.astore(grid, Value::from(array))?;
                Ok(Some(frame.aload(grid)?))
            }),
        )
        .with_locals(locals),
    );

    Ok(methods)
}
